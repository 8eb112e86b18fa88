/// Declare a struct that tessera can describe, encode, and decode.
///
/// The first attribute must be `#[object(name = "...")]` for a named type, or
/// `#[object]` for an anonymous one. Other struct attributes pass through.
/// A field marked `#[schema = "Name"]` gets the tag `schema=Name`, which
/// declares the schema its references point to.
///
/// ```
/// use tessera_schema::object;
/// use tessera_types::{Reference, References};
///
/// object! {
///     #[object(name = "Team")]
///     #[derive(Debug, Clone, Default)]
///     pub struct Team {
///         pub title: String,
///         #[schema = "Team"]
///         pub parent: Reference,
///         #[schema = "Team"]
///         pub children: References,
///     }
/// }
/// ```
#[macro_export]
macro_rules! object {
    (
        @define [$name:expr]
        $(#[$meta:meta])*
        $vis:vis struct $ty:ident {
            $( $(#[schema = $target:literal])? $fvis:vis $field:ident : $fty:ty ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $ty {
            $( $fvis $field: $fty, )*
        }

        impl $crate::Typed for $ty {
            fn type_info() -> $crate::TypeInfo {
                $crate::TypeInfo {
                    key: ::std::string::String::from(::core::concat!(
                        ::core::module_path!(),
                        "::",
                        ::core::stringify!($ty)
                    )),
                    name: $name,
                    kind: $crate::TypeKind::Struct {
                        fields: ::std::vec![
                            $(
                                $crate::FieldInfo {
                                    name: ::core::stringify!($field),
                                    tag: ::core::concat!("" $(, "schema=", $target)?),
                                    ty: <$fty as $crate::Typed>::type_info,
                                },
                            )*
                        ],
                    },
                }
            }
        }

        impl $crate::encoding::Encode for $ty {
            #[allow(unused_variables)]
            fn encode(
                &self,
                enc: &mut $crate::encoding::Encoder,
            ) -> $crate::encoding::EncodingResult<()> {
                $( $crate::encoding::Encode::encode(&self.$field, enc)?; )*
                ::core::result::Result::Ok(())
            }
        }

        impl $crate::encoding::Decode for $ty {
            #[allow(unused_variables)]
            fn decode(
                dec: &mut $crate::encoding::Decoder<'_>,
            ) -> $crate::encoding::EncodingResult<Self> {
                ::core::result::Result::Ok(Self {
                    $( $field: $crate::encoding::Decode::decode(dec)?, )*
                })
            }
        }
    };

    (
        #[object(name = $name:literal)]
        $($rest:tt)*
    ) => {
        $crate::object!(@define [::core::option::Option::Some($name)] $($rest)*);
    };

    (
        #[object]
        $($rest:tt)*
    ) => {
        $crate::object!(@define [::core::option::Option::None] $($rest)*);
    };
}
