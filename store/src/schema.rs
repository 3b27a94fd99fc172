//! Key layout and stored field names.
//!
//! Every key the workspace reads or writes is built here so that the repositories and the
//! test factories agree on the layout.
//!
//! | Key                                  | Type       | Contents                         |
//! |--------------------------------------|------------|----------------------------------|
//! | `counter:{kind}`                     | string     | last issued ID                   |
//! | `{kind}:{id}`                        | hash       | entity record                    |
//! | `users` / `resources` / `bookings`   | sorted set | global listing                   |
//! | `user:email:{email}`                 | string     | ID of the user owning the email  |
//! | `user:{id}:resources`                | sorted set | resources owned by the user      |
//! | `user:{id}:bookings[:{date}]`        | sorted set | bookings made by the user        |
//! | `resource:{id}:bookings[:{date}]`    | sorted set | bookings against the resource    |
//! | `user:{id}:connections`              | sorted set | connected user IDs               |
//! | `user:{id}:interests`                | sorted set | interest tags of the user        |
//! | `interest:{tag}`                     | sorted set | users tagged with the interest   |
//! | `seat:{resource}:{date}:{seat}`      | string     | ID of the booking holding a seat |

use std::fmt;

/// Width entity IDs are zero-padded to when stored as sorted set members.
///
/// Redis breaks score ties by member bytes; padding makes that order equal to numeric ID order.
pub const ID_MEMBER_WIDTH: usize = 20;

/// The kinds of entity persisted by the workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    User,
    Resource,
    Booking,
}

impl EntityKind {
    /// Prefix used in record and counter keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Resource => "resource",
            Self::Booking => "booking",
        }
    }

    /// Key of the ID counter for this kind.
    pub fn counter_key(&self) -> String {
        format!("counter:{}", self.as_str())
    }

    /// Key of the record hash for entity `id`.
    pub fn record_key(&self, id: u64) -> String {
        format!("{}:{}", self.as_str(), id)
    }

    /// Key of the global, creation-ordered listing of this kind.
    pub fn listing_key(&self) -> &'static str {
        match self {
            Self::User => "users",
            Self::Resource => "resources",
            Self::Booking => "bookings",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Encodes an entity ID as a sorted set member.
pub fn id_member(id: u64) -> String {
    format!("{:0width$}", id, width = ID_MEMBER_WIDTH)
}

/// Decodes a sorted set member written by [`id_member`]. Unpadded IDs are accepted too.
pub fn parse_id_member(member: &str) -> Option<u64> {
    member.parse::<u64>().ok()
}

/// Field names shared by every record.
pub mod field {
    pub const ID: &str = "id";
    pub const CREATED_AT: &str = "createdAt";
    pub const UPDATED_AT: &str = "updatedAt";
}

/// User record fields and user-scoped keys.
pub mod user {
    pub const EMAIL: &str = "email";
    pub const PASSWORD: &str = "password";
    pub const FIRSTNAME: &str = "firstname";
    pub const LASTNAME: &str = "lastname";
    pub const DESCRIPTION: &str = "description";
    pub const IMAGE_URL: &str = "imageURL";
    pub const BIRTHDATE: &str = "birthdate";
    pub const TRAVELLING_AS: &str = "travellingAs";
    pub const WECHAT_NUMBER: &str = "wechatNumber";
    pub const LINE_NUMBER: &str = "lineNumber";
    pub const FACEBOOK_NUMBER: &str = "facebookNumber";
    pub const SKYPE_NUMBER: &str = "skypeNumber";
    pub const WHATSAPP_NUMBER: &str = "whatsappNumber";

    pub fn email_key(email: &str) -> String {
        format!("user:email:{}", email)
    }

    pub fn connections_key(user_id: u64) -> String {
        format!("user:{}:connections", user_id)
    }

    pub fn interests_key(user_id: u64) -> String {
        format!("user:{}:interests", user_id)
    }

    pub fn resources_key(user_id: u64) -> String {
        format!("user:{}:resources", user_id)
    }

    pub fn bookings_key(user_id: u64) -> String {
        format!("user:{}:bookings", user_id)
    }

    pub fn bookings_on_date_key(user_id: u64, date: &str) -> String {
        format!("user:{}:bookings:{}", user_id, date)
    }
}

/// Resource record fields and resource-scoped keys.
pub mod resource {
    pub const USER_ID: &str = "userID";
    pub const NAME: &str = "name";
    pub const CAPACITY: &str = "capacity";
    pub const OPENING_TIME: &str = "openingTime";
    pub const CLOSING_TIME: &str = "closingTime";

    pub fn bookings_key(resource_id: u64) -> String {
        format!("resource:{}:bookings", resource_id)
    }

    pub fn bookings_on_date_key(resource_id: u64, date: &str) -> String {
        format!("resource:{}:bookings:{}", resource_id, date)
    }

    /// Claim key holding the ID of the booking occupying a seat on a date.
    pub fn seat_key(resource_id: u64, date: &str, seat_position: u32) -> String {
        format!("seat:{}:{}:{}", resource_id, date, seat_position)
    }
}

/// Booking record fields.
pub mod booking {
    pub const RESOURCE_ID: &str = "resourceID";
    pub const USER_ID: &str = "userID";
    pub const SEAT_POSITION: &str = "seatPosition";
    pub const DATE: &str = "date";
}

/// Interest-scoped keys.
pub mod interest {
    pub fn users_key(tag: &str) -> String {
        format!("interest:{}", tag)
    }
}
