//! User domain models and parameter types.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use store::schema::{field, user, EntityKind};

use crate::{
    data::entity::{Entity, UniqueRef},
    error::{record::RecordError, AppError},
    util::{
        form::FormReader,
        parse::format_date,
        record::{encode_fields, encode_timestamp, FieldReader},
    },
};

/// Form field carrying a comma-separated list of interest tags.
pub const INTERESTS_FIELD: &str = "interests";

/// Rejects blank interest tags, which would address a tag listing with no name.
pub fn check_interests(tags: &[String]) -> Result<(), AppError> {
    if tags.iter().any(|tag| tag.trim().is_empty()) {
        return Err(AppError::BadRequest("Interest tag cannot be empty".to_string()));
    }
    Ok(())
}

/// Optional profile fields of a user.
///
/// Used both as the stored profile and as the set of changes in an update, where `None` means
/// "leave unchanged".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "imageURL")]
    pub image_url: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub travelling_as: Option<String>,
    pub wechat_number: Option<String>,
    pub line_number: Option<String>,
    pub facebook_number: Option<String>,
    pub skype_number: Option<String>,
    pub whatsapp_number: Option<String>,
}

impl UserProfile {
    /// Reads profile fields from a caller-supplied field map.
    pub fn from_form(form: &FormReader<'_>) -> Result<Self, AppError> {
        Ok(Self {
            firstname: form.str(user::FIRSTNAME),
            lastname: form.str(user::LASTNAME),
            description: form.str(user::DESCRIPTION),
            image_url: form.str(user::IMAGE_URL),
            birthdate: form.date(user::BIRTHDATE)?,
            travelling_as: form.str(user::TRAVELLING_AS),
            wechat_number: form.str(user::WECHAT_NUMBER),
            line_number: form.str(user::LINE_NUMBER),
            facebook_number: form.str(user::FACEBOOK_NUMBER),
            skype_number: form.str(user::SKYPE_NUMBER),
            whatsapp_number: form.str(user::WHATSAPP_NUMBER),
        })
    }

    fn from_record(record: &FieldReader<'_>) -> Result<Self, RecordError> {
        Ok(Self {
            firstname: record.optional_str(user::FIRSTNAME),
            lastname: record.optional_str(user::LASTNAME),
            description: record.optional_str(user::DESCRIPTION),
            image_url: record.optional_str(user::IMAGE_URL),
            birthdate: record.optional_date(user::BIRTHDATE)?,
            travelling_as: record.optional_str(user::TRAVELLING_AS),
            wechat_number: record.optional_str(user::WECHAT_NUMBER),
            line_number: record.optional_str(user::LINE_NUMBER),
            facebook_number: record.optional_str(user::FACEBOOK_NUMBER),
            skype_number: record.optional_str(user::SKYPE_NUMBER),
            whatsapp_number: record.optional_str(user::WHATSAPP_NUMBER),
        })
    }

    fn encode(&self) -> Vec<(&'static str, Option<String>)> {
        vec![
            (user::FIRSTNAME, self.firstname.clone()),
            (user::LASTNAME, self.lastname.clone()),
            (user::DESCRIPTION, self.description.clone()),
            (user::IMAGE_URL, self.image_url.clone()),
            (user::BIRTHDATE, self.birthdate.as_ref().map(format_date)),
            (user::TRAVELLING_AS, self.travelling_as.clone()),
            (user::WECHAT_NUMBER, self.wechat_number.clone()),
            (user::LINE_NUMBER, self.line_number.clone()),
            (user::FACEBOOK_NUMBER, self.facebook_number.clone()),
            (user::SKYPE_NUMBER, self.skype_number.clone()),
            (user::WHATSAPP_NUMBER, self.whatsapp_number.clone()),
        ]
    }

    /// Overwrites every field `changes` supplies and returns the stored names of those fields.
    pub fn merge(&mut self, changes: UserProfile) -> Vec<&'static str> {
        fn set<T>(
            target: &mut Option<T>,
            value: Option<T>,
            name: &'static str,
            touched: &mut Vec<&'static str>,
        ) {
            if let Some(value) = value {
                *target = Some(value);
                touched.push(name);
            }
        }

        let mut touched = Vec::new();
        set(&mut self.firstname, changes.firstname, user::FIRSTNAME, &mut touched);
        set(&mut self.lastname, changes.lastname, user::LASTNAME, &mut touched);
        set(&mut self.description, changes.description, user::DESCRIPTION, &mut touched);
        set(&mut self.image_url, changes.image_url, user::IMAGE_URL, &mut touched);
        set(&mut self.birthdate, changes.birthdate, user::BIRTHDATE, &mut touched);
        set(&mut self.travelling_as, changes.travelling_as, user::TRAVELLING_AS, &mut touched);
        set(&mut self.wechat_number, changes.wechat_number, user::WECHAT_NUMBER, &mut touched);
        set(&mut self.line_number, changes.line_number, user::LINE_NUMBER, &mut touched);
        set(&mut self.facebook_number, changes.facebook_number, user::FACEBOOK_NUMBER, &mut touched);
        set(&mut self.skype_number, changes.skype_number, user::SKYPE_NUMBER, &mut touched);
        set(&mut self.whatsapp_number, changes.whatsapp_number, user::WHATSAPP_NUMBER, &mut touched);
        touched
    }
}

/// A registered user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub email: String,
    /// Opaque credential hash supplied by the authentication layer. Never serialized.
    #[serde(skip_serializing)]
    pub password: Option<String>,
    #[serde(flatten)]
    pub profile: UserProfile,
    /// Interest tags. Kept in the relation graph, not in the user record.
    pub interests: Vec<String>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_seconds_option")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Parameters for registering a user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateUserParam {
    pub email: String,
    pub password: Option<String>,
    pub profile: UserProfile,
    pub interests: Vec<String>,
}

impl CreateUserParam {
    /// Creates parameters with only the required email set.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..Default::default()
        }
    }

    /// Reads registration parameters from a caller-supplied field map.
    ///
    /// # Returns
    /// - `Ok(CreateUserParam)` - Parsed parameters
    /// - `Err(AppError::MissingRequiredField)` - No `email` was supplied
    /// - `Err(AppError::BadRequest)` - A field failed to parse
    pub fn from_form(fields: &HashMap<String, String>) -> Result<Self, AppError> {
        let form = FormReader::new(fields);

        Ok(Self {
            email: form.required_str(user::EMAIL)?,
            password: form.str(user::PASSWORD),
            profile: UserProfile::from_form(&form)?,
            interests: form.list(INTERESTS_FIELD).unwrap_or_default(),
        })
    }
}

/// Parameters for updating a user. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateUserParam {
    pub id: u64,
    pub email: Option<String>,
    pub password: Option<String>,
    pub profile: UserProfile,
    /// Replacement tag set; `Some(vec![])` clears every tag.
    pub interests: Option<Vec<String>>,
}

impl UpdateUserParam {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    /// Reads update parameters from a caller-supplied field map.
    ///
    /// # Returns
    /// - `Ok(UpdateUserParam)` - Parsed parameters
    /// - `Err(AppError::MissingKey)` - No `id` was supplied
    /// - `Err(AppError::BadRequest)` - A field failed to parse
    pub fn from_form(fields: &HashMap<String, String>) -> Result<Self, AppError> {
        let form = FormReader::new(fields);

        Ok(Self {
            id: form.key()?,
            email: form.str(user::EMAIL),
            password: form.str(user::PASSWORD),
            profile: UserProfile::from_form(&form)?,
            interests: form.list(INTERESTS_FIELD),
        })
    }
}

/// Identifies a user by ID or by email address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GetUserParam {
    Id(u64),
    Email(String),
}

impl Entity for User {
    type Draft = CreateUserParam;
    type Patch = UpdateUserParam;

    const KIND: EntityKind = EntityKind::User;

    fn validate_draft(draft: &Self::Draft) -> Result<(), AppError> {
        if draft.email.trim().is_empty() {
            return Err(AppError::MissingRequiredField(user::EMAIL));
        }
        check_interests(&draft.interests)
    }

    fn from_draft(id: u64, created_at: DateTime<Utc>, draft: Self::Draft) -> Self {
        Self {
            id,
            email: draft.email,
            password: draft.password,
            profile: draft.profile,
            interests: draft.interests,
            created_at,
            updated_at: None,
        }
    }

    fn apply_patch(&mut self, patch: Self::Patch) -> Result<Vec<&'static str>, AppError> {
        let mut touched = Vec::new();
        if let Some(email) = patch.email {
            if email.trim().is_empty() {
                return Err(AppError::MissingRequiredField(user::EMAIL));
            }
            self.email = email;
            touched.push(user::EMAIL);
        }
        if let Some(password) = patch.password {
            self.password = Some(password);
            touched.push(user::PASSWORD);
        }
        touched.extend(self.profile.merge(patch.profile));
        if let Some(interests) = patch.interests {
            check_interests(&interests)?;
            self.interests = interests;
        }
        Ok(touched)
    }

    fn id(&self) -> u64 {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn set_updated_at(&mut self, at: DateTime<Utc>) {
        self.updated_at = Some(at);
    }

    fn to_fields(&self) -> Vec<(String, String)> {
        let mut fields = vec![
            (field::ID, Some(self.id.to_string())),
            (user::EMAIL, Some(self.email.clone())),
            (user::PASSWORD, self.password.clone()),
            (field::CREATED_AT, Some(encode_timestamp(&self.created_at))),
            (field::UPDATED_AT, self.updated_at.as_ref().map(encode_timestamp)),
        ];
        fields.extend(self.profile.encode());
        encode_fields(fields)
    }

    fn from_fields(key: &str, fields: &HashMap<String, String>) -> Result<Self, RecordError> {
        let record = FieldReader::new(key, fields);

        Ok(Self {
            id: record.required_u64(field::ID)?,
            email: record.required_str(user::EMAIL)?,
            password: record.optional_str(user::PASSWORD),
            profile: UserProfile::from_record(&record)?,
            interests: Vec::new(),
            created_at: record.required_timestamp(field::CREATED_AT)?,
            updated_at: record.optional_timestamp(field::UPDATED_AT)?,
        })
    }

    fn unique_refs(&self) -> Vec<UniqueRef> {
        vec![UniqueRef::new(
            user::email_key(&self.email),
            format!("Email {} is already registered", self.email),
        )]
    }
}
