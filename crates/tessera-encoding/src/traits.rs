use tessera_types::{Dynamic, Reference, References, REFERENCE_SIZE};

use crate::codec::{Decoder, Encoder};
use crate::error::{EncodingError, EncodingResult};

/// A value with a canonical encoding.
pub trait Encode {
    fn encode(&self, enc: &mut Encoder) -> EncodingResult<()>;
}

/// A value that can be read back from its canonical encoding.
pub trait Decode: Sized {
    fn decode(dec: &mut Decoder<'_>) -> EncodingResult<Self>;
}

/// Encode a value into a fresh buffer.
pub fn encode_to_vec<T: Encode + ?Sized>(value: &T) -> EncodingResult<Vec<u8>> {
    let mut enc = Encoder::new();
    value.encode(&mut enc)?;
    Ok(enc.into_bytes())
}

/// Decode a value that must span the whole buffer.
pub fn decode_from_slice<T: Decode>(data: &[u8]) -> EncodingResult<T> {
    let mut dec = Decoder::new(data);
    let value = T::decode(&mut dec)?;
    dec.finish()?;
    Ok(value)
}

macro_rules! impl_int {
    ($($ty:ty => $width:literal),* $(,)?) => {
        $(
            impl Encode for $ty {
                fn encode(&self, enc: &mut Encoder) -> EncodingResult<()> {
                    enc.put_raw(&self.to_le_bytes());
                    Ok(())
                }
            }

            impl Decode for $ty {
                fn decode(dec: &mut Decoder<'_>) -> EncodingResult<Self> {
                    dec.take_array::<$width>().map(<$ty>::from_le_bytes)
                }
            }
        )*
    };
}

impl_int!(
    u8 => 1, u16 => 2, u32 => 4, u64 => 8,
    i8 => 1, i16 => 2, i32 => 4, i64 => 8,
);

impl Encode for f32 {
    fn encode(&self, enc: &mut Encoder) -> EncodingResult<()> {
        enc.put_u32(self.to_bits());
        Ok(())
    }
}

impl Decode for f32 {
    fn decode(dec: &mut Decoder<'_>) -> EncodingResult<Self> {
        dec.get_u32().map(f32::from_bits)
    }
}

impl Encode for f64 {
    fn encode(&self, enc: &mut Encoder) -> EncodingResult<()> {
        enc.put_u64(self.to_bits());
        Ok(())
    }
}

impl Decode for f64 {
    fn decode(dec: &mut Decoder<'_>) -> EncodingResult<Self> {
        dec.get_u64().map(f64::from_bits)
    }
}

impl Encode for bool {
    fn encode(&self, enc: &mut Encoder) -> EncodingResult<()> {
        enc.put_u8(u8::from(*self));
        Ok(())
    }
}

impl Decode for bool {
    fn decode(dec: &mut Decoder<'_>) -> EncodingResult<Self> {
        match dec.get_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            b => Err(EncodingError::InvalidBool(b)),
        }
    }
}

impl Encode for str {
    fn encode(&self, enc: &mut Encoder) -> EncodingResult<()> {
        enc.put_str(self)
    }
}

impl Encode for String {
    fn encode(&self, enc: &mut Encoder) -> EncodingResult<()> {
        enc.put_str(self)
    }
}

impl Decode for String {
    fn decode(dec: &mut Decoder<'_>) -> EncodingResult<Self> {
        dec.get_str().map(str::to_owned)
    }
}

impl<T: Encode> Encode for [T] {
    fn encode(&self, enc: &mut Encoder) -> EncodingResult<()> {
        enc.put_len(self.len())?;
        self.iter().try_for_each(|v| v.encode(enc))
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn encode(&self, enc: &mut Encoder) -> EncodingResult<()> {
        self.as_slice().encode(enc)
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn decode(dec: &mut Decoder<'_>) -> EncodingResult<Self> {
        let count = dec.get_len()?;
        // Every element takes at least one byte except zero-sized structs,
        // so capping by what is left bounds the allocation.
        let mut out = Vec::with_capacity(count.min(dec.remaining()));
        for _ in 0..count {
            out.push(T::decode(dec)?);
        }
        Ok(out)
    }
}

impl<T: Encode, const N: usize> Encode for [T; N] {
    fn encode(&self, enc: &mut Encoder) -> EncodingResult<()> {
        self.iter().try_for_each(|v| v.encode(enc))
    }
}

impl<T: Decode, const N: usize> Decode for [T; N] {
    fn decode(dec: &mut Decoder<'_>) -> EncodingResult<Self> {
        let mut items = Vec::with_capacity(N);
        for _ in 0..N {
            items.push(T::decode(dec)?);
        }
        items
            .try_into()
            .map_err(|_| EncodingError::Invalid(format!("array of length {N}")))
    }
}

impl Encode for Reference {
    fn encode(&self, enc: &mut Encoder) -> EncodingResult<()> {
        enc.put_raw(self.as_bytes());
        Ok(())
    }
}

impl Decode for Reference {
    fn decode(dec: &mut Decoder<'_>) -> EncodingResult<Self> {
        dec.take_array::<REFERENCE_SIZE>().map(Reference::from_hash)
    }
}

impl Encode for References {
    fn encode(&self, enc: &mut Encoder) -> EncodingResult<()> {
        self.as_slice().encode(enc)
    }
}

impl Decode for References {
    fn decode(dec: &mut Decoder<'_>) -> EncodingResult<Self> {
        let count = dec.get_counted_len(REFERENCE_SIZE)?;
        (0..count).map(|_| Reference::decode(dec)).collect()
    }
}

impl Encode for Dynamic {
    fn encode(&self, enc: &mut Encoder) -> EncodingResult<()> {
        self.schema.encode(enc)?;
        self.object.encode(enc)
    }
}

impl Decode for Dynamic {
    fn decode(dec: &mut Decoder<'_>) -> EncodingResult<Self> {
        let schema = Reference::decode(dec)?;
        let object = Reference::decode(dec)?;
        Ok(Dynamic::new(schema, object))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn scalar_widths() {
        assert_eq!(encode_to_vec(&true).unwrap().len(), 1);
        assert_eq!(encode_to_vec(&-1i16).unwrap().len(), 2);
        assert_eq!(encode_to_vec(&1.5f32).unwrap().len(), 4);
        assert_eq!(encode_to_vec(&7u64).unwrap().len(), 8);
    }

    #[test]
    fn slice_prefix_counts_elements() {
        let bytes = encode_to_vec(&vec![1u16, 2, 3]).unwrap();
        assert_eq!(&bytes[..4], &3u32.to_le_bytes());
        assert_eq!(bytes.len(), 4 + 3 * 2);
    }

    #[test]
    fn array_has_no_prefix() {
        let bytes = encode_to_vec(&[9u32; 3]).unwrap();
        assert_eq!(bytes.len(), 12);
        let back: [u32; 3] = decode_from_slice(&bytes).unwrap();
        assert_eq!(back, [9, 9, 9]);
    }

    #[test]
    fn reference_shapes_have_fixed_layouts() {
        let a = Reference::sum(b"a");
        let b = Reference::sum(b"b");
        assert_eq!(encode_to_vec(&a).unwrap().len(), 32);
        assert_eq!(encode_to_vec(&Dynamic::new(a, b)).unwrap().len(), 64);

        let refs = References::from(vec![a, b]);
        let bytes = encode_to_vec(&refs).unwrap();
        assert_eq!(bytes.len(), 4 + 64);
        assert_eq!(decode_from_slice::<References>(&bytes).unwrap(), refs);
    }

    #[test]
    fn references_with_lying_count_are_truncated() {
        let mut bytes = 5u32.to_le_bytes().to_vec();
        bytes.extend_from_slice(&[0u8; 32]);
        assert!(matches!(
            decode_from_slice::<References>(&bytes),
            Err(EncodingError::Truncated { .. })
        ));
    }

    #[test]
    fn invalid_bool_rejected() {
        assert_eq!(
            decode_from_slice::<bool>(&[2]).unwrap_err(),
            EncodingError::InvalidBool(2)
        );
    }

    #[test]
    fn vec_with_huge_count_does_not_overallocate() {
        let bytes = u32::MAX.to_le_bytes();
        assert!(matches!(
            decode_from_slice::<Vec<u64>>(&bytes),
            Err(EncodingError::Truncated { .. })
        ));
    }

    proptest! {
        #[test]
        fn encoding_is_deterministic(name in ".*", nums in proptest::collection::vec(any::<i64>(), 0..16)) {
            let first = (encode_to_vec(&name).unwrap(), encode_to_vec(&nums).unwrap());
            let second = (encode_to_vec(&name).unwrap(), encode_to_vec(&nums).unwrap());
            prop_assert_eq!(&first, &second);
            prop_assert_eq!(Reference::sum(&first.1), Reference::sum(&second.1));
            prop_assert_eq!(decode_from_slice::<Vec<i64>>(&first.1).unwrap(), nums);
        }

        #[test]
        fn decoding_arbitrary_bytes_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..128)) {
            let _ = decode_from_slice::<Vec<String>>(&bytes);
            let _ = decode_from_slice::<References>(&bytes);
        }
    }
}
