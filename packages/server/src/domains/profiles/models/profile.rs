use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use thiserror::Error;

use crate::common::MemberId;

const MAX_CITY_CHARS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "blood_group")]
pub enum BloodGroup {
    #[serde(rename = "A+")]
    #[sqlx(rename = "A+")]
    APositive,
    #[serde(rename = "A-")]
    #[sqlx(rename = "A-")]
    ANegative,
    #[serde(rename = "B+")]
    #[sqlx(rename = "B+")]
    BPositive,
    #[serde(rename = "B-")]
    #[sqlx(rename = "B-")]
    BNegative,
    #[serde(rename = "AB+")]
    #[sqlx(rename = "AB+")]
    AbPositive,
    #[serde(rename = "AB-")]
    #[sqlx(rename = "AB-")]
    AbNegative,
    #[serde(rename = "O+")]
    #[sqlx(rename = "O+")]
    OPositive,
    #[serde(rename = "O-")]
    #[sqlx(rename = "O-")]
    ONegative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "gender", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Female,
    Male,
    NonBinary,
    Transgender,
    Other,
    PreferNotToSay,
}

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Phone number must be 7 to 15 digits, optionally starting with +")]
    InvalidPhone,

    #[error("Date of birth cannot be in the future")]
    FutureDateOfBirth,

    #[error("City must be at most {MAX_CITY_CHARS} characters")]
    CityTooLong,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ProfileError {
    pub fn is_validation(&self) -> bool {
        !matches!(self, ProfileError::Database(_))
    }
}

/// Fields a member may set on their profile. Missing fields are cleared.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProfileInput {
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub blood_group: Option<BloodGroup>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
}

impl ProfileInput {
    /// Trim, normalize and check every field against `today`.
    pub fn validate(self, today: NaiveDate) -> Result<Self, ProfileError> {
        let phone = match blank_to_none(self.phone) {
            Some(raw) => Some(normalize_phone(&raw)?),
            None => None,
        };

        let city = blank_to_none(self.city);
        if city
            .as_deref()
            .is_some_and(|c| c.chars().count() > MAX_CITY_CHARS)
        {
            return Err(ProfileError::CityTooLong);
        }

        if self.date_of_birth.is_some_and(|dob| dob > today) {
            return Err(ProfileError::FutureDateOfBirth);
        }

        Ok(Self {
            phone,
            blood_group: self.blood_group,
            city,
            gender: self.gender,
            date_of_birth: self.date_of_birth,
        })
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Strip spaces, dashes and parentheses, then require `+?[0-9]{7,15}`.
fn normalize_phone(raw: &str) -> Result<String, ProfileError> {
    let compact: String = raw
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect();
    let digits = compact.strip_prefix('+').unwrap_or(&compact);
    if !(7..=15).contains(&digits.len()) || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ProfileError::InvalidPhone);
    }
    Ok(compact)
}

/// Optional personal details kept alongside a member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserProfile {
    pub member_id: MemberId,
    pub phone: Option<String>,
    pub blood_group: Option<BloodGroup>,
    pub city: Option<String>,
    pub gender: Option<Gender>,
    pub date_of_birth: Option<NaiveDate>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    pub async fn find(member_id: MemberId, pool: &PgPool) -> Result<Option<Self>, ProfileError> {
        sqlx::query_as::<_, Self>("SELECT * FROM user_profiles WHERE member_id = $1")
            .bind(member_id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Validate and save, creating the profile on first save.
    pub async fn upsert(
        member_id: MemberId,
        input: ProfileInput,
        pool: &PgPool,
    ) -> Result<Self, ProfileError> {
        let input = input.validate(Utc::now().date_naive())?;

        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO user_profiles (member_id, phone, blood_group, city, gender, date_of_birth)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (member_id) DO UPDATE SET
                phone = EXCLUDED.phone,
                blood_group = EXCLUDED.blood_group,
                city = EXCLUDED.city,
                gender = EXCLUDED.gender,
                date_of_birth = EXCLUDED.date_of_birth,
                updated_at = now()
            RETURNING *
            "#,
        )
        .bind(member_id)
        .bind(input.phone)
        .bind(input.blood_group)
        .bind(input.city)
        .bind(input.gender)
        .bind(input.date_of_birth)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    #[test]
    fn test_phone_normalized() {
        let input = ProfileInput {
            phone: Some(" +91 98765-43210 ".to_string()),
            ..Default::default()
        };
        let valid = input.validate(today()).unwrap();
        assert_eq!(valid.phone.as_deref(), Some("+919876543210"));
    }

    #[test]
    fn test_phone_rejected() {
        for bad in ["12345", "+1234567890123456", "98765abc43", "++9876543210"] {
            let input = ProfileInput {
                phone: Some(bad.to_string()),
                ..Default::default()
            };
            assert!(
                matches!(input.validate(today()), Err(ProfileError::InvalidPhone)),
                "{bad}"
            );
        }
    }

    #[test]
    fn test_blank_fields_cleared() {
        let input = ProfileInput {
            phone: Some("   ".to_string()),
            city: Some("".to_string()),
            ..Default::default()
        };
        assert_eq!(input.validate(today()).unwrap(), ProfileInput::default());
    }

    #[test]
    fn test_future_birth_date_rejected() {
        let input = ProfileInput {
            date_of_birth: NaiveDate::from_ymd_opt(2025, 6, 2),
            ..Default::default()
        };
        assert!(matches!(
            input.validate(today()),
            Err(ProfileError::FutureDateOfBirth)
        ));

        let born_today = ProfileInput {
            date_of_birth: Some(today()),
            ..Default::default()
        };
        assert!(born_today.validate(today()).is_ok());
    }

    #[test]
    fn test_city_length() {
        let input = ProfileInput {
            city: Some("x".repeat(MAX_CITY_CHARS + 1)),
            ..Default::default()
        };
        assert!(matches!(
            input.validate(today()),
            Err(ProfileError::CityTooLong)
        ));
    }

    #[test]
    fn test_enum_wire_names() {
        let input: ProfileInput =
            serde_json::from_str(r#"{"blood_group":"AB-","gender":"non_binary"}"#).unwrap();
        assert_eq!(input.blood_group, Some(BloodGroup::AbNegative));
        assert_eq!(input.gender, Some(Gender::NonBinary));
        assert!(serde_json::from_str::<ProfileInput>(r#"{"blood_group":"C+"}"#).is_err());
    }
}
