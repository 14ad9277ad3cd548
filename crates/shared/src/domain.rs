use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(PostId);
id_newtype!(UserId);

/// A post as the remote API represents it. The server assigns `id`; a draft
/// that was never persisted has none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub user_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<PostId>,
    pub title: String,
    pub body: String,
}

impl Post {
    /// The edit form's starting state: user 1, empty title and body, no id.
    pub fn empty_draft() -> Self {
        Self {
            user_id: UserId(1),
            id: None,
            title: String::new(),
            body: String::new(),
        }
    }
}
