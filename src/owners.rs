// 👤 Owners - who the payout identifiers belong to
//
// Registration takes an email OR a phone (at least one), plus an optional
// display name that becomes the public profile slug. Password handling is
// the auth layer's job and is not modelled here.

use crate::error::{FieldError, ValidationErrorKind, ValidationErrors};
use crate::phone::canonical_phone;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MAX_DISPLAY_NAME_CHARS: usize = 150;
pub const MAX_SLUG_CHARS: usize = 50;

/// Registration form as submitted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub phone: Option<String>,

    #[serde(default)]
    pub display_name: Option<String>,
}

/// Registration after normalization; blank contacts are None
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOwner {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub display_name: String,
}

/// Stored owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    /// Stable identity (UUID)
    pub id: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub display_name: String,
    pub public_slug: String,
    pub created_at: DateTime<Utc>,
}

impl Owner {
    /// Name shown on the public profile
    pub fn label(&self) -> &str {
        if !self.display_name.is_empty() {
            self.display_name.as_str()
        } else if let Some(email) = &self.email {
            email.as_str()
        } else {
            self.phone.as_deref().unwrap_or(&self.public_slug)
        }
    }

    pub fn profile_path(&self) -> String {
        public_profile_path(&self.public_slug)
    }
}

fn blank_to_none(s: &Option<String>) -> Option<&str> {
    s.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Loose shape check: something@domain.tld
fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

impl Registration {
    /// Normalize and validate the form (uniqueness is checked by the store)
    pub fn validate(&self) -> Result<NewOwner, ValidationErrors> {
        let mut errors = Vec::new();

        let email = blank_to_none(&self.email).map(|e| e.to_lowercase());
        if let Some(e) = &email {
            if !looks_like_email(e) {
                errors.push(FieldError::new(
                    "email",
                    ValidationErrorKind::InvalidFormat,
                    "Enter a valid email address.",
                ));
            }
        }

        let phone = match blank_to_none(&self.phone) {
            Some(raw) => {
                let canonical = canonical_phone(raw);
                if canonical.is_none() {
                    errors.push(FieldError::new(
                        "phone",
                        ValidationErrorKind::InvalidPhone,
                        "Phone must be +52XXXXXXXXXX or XXXXXXXXXX.",
                    ));
                }
                canonical
            }
            None => None,
        };

        if email.is_none() && blank_to_none(&self.phone).is_none() {
            errors.push(FieldError::new(
                "contact",
                ValidationErrorKind::MissingValue,
                "Provide an email or a phone number.",
            ));
        }

        let display_name = blank_to_none(&self.display_name).unwrap_or("").to_string();
        if display_name.chars().count() > MAX_DISPLAY_NAME_CHARS {
            errors.push(FieldError::new(
                "display_name",
                ValidationErrorKind::InvalidFormat,
                format!("Display name must be at most {} characters.", MAX_DISPLAY_NAME_CHARS),
            ));
        }

        ValidationErrors::into_result(errors)?;

        Ok(NewOwner {
            email,
            phone,
            display_name,
        })
    }
}

/// Lower-case ASCII slug: "Tacos El Güero" → "tacos-el-g-ero"
pub fn slugify(text: &str) -> String {
    let mut slug = String::new();
    let mut pending_dash = false;

    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
        if slug.len() >= MAX_SLUG_CHARS {
            break;
        }
    }

    slug
}

/// Slug for a new owner: from the display name, else a random one
pub fn base_slug(new_owner: &NewOwner) -> String {
    let slug = slugify(&new_owner.display_name);
    if slug.is_empty() {
        let id = uuid::Uuid::new_v4().simple().to_string();
        format!("u-{}", &id[..8])
    } else {
        slug
    }
}

/// URL path of the public profile page
pub fn public_profile_path(slug: &str) -> String {
    format!("/u/{}/", urlencoding::encode(slug))
}
