//! Sample object graph written by `tessera demo`.

use tessera_schema::object;
use tessera_types::{Dynamic, Reference, References};
use tessera_want::Container;

object! {
    #[object(name = "User")]
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct User {
        pub name: String,
        pub age: u32,
    }
}

object! {
    #[object(name = "Group")]
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct Group {
        pub name: String,
        #[schema = "User"]
        pub leader: Reference,
        #[schema = "User"]
        pub members: References,
        pub curator: Dynamic,
    }
}

/// Store a small group of users and return the group's root.
pub fn populate(container: &Container) -> anyhow::Result<Dynamic> {
    container.registry().schema_of::<User>()?;

    let users = [("ada", 36), ("grace", 45), ("edsger", 72)]
        .into_iter()
        .map(|(name, age)| User {
            name: name.to_string(),
            age,
        })
        .collect::<Vec<_>>();
    let members = container.save_all(&users)?;
    let leader = members.as_slice()[0];
    let curator = container.dynamic(&User {
        name: "barbara".into(),
        age: 50,
    })?;

    let root = container.dynamic(&Group {
        name: "pioneers".into(),
        leader,
        members,
        curator,
    })?;
    Ok(root)
}
