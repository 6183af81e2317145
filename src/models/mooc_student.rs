//! Six Ways MOOC student profiles.
//!
//! A profile is created blank the first time a signed-in user opens the
//! course, and filled in through the student details form.

use serde::Deserialize;
use uuid::Uuid;

use crate::error::FieldErrors;

pub const GENDERS: &[&str] = &["male", "female", "other"];

pub const SEMESTERS: &[&str] = &[
    "I", "II", "III", "IV", "V", "VI", "VII", "VIII", "Graduated", "Other",
];

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct MoocStudent {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: Option<String>,
    pub gender: Option<String>,
    pub university_id: Option<Uuid>,
    pub college: Option<String>,
    pub semester: Option<String>,
    pub state: Option<String>,
}

impl MoocStudent {
    /// Blank profile for a user who has not filled in any details yet.
    pub fn blank(user_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            name: None,
            gender: None,
            university_id: None,
            college: None,
            semester: None,
            state: None,
        }
    }

    /// Whether the student can start the course.
    pub fn details_complete(&self) -> bool {
        [
            &self.name,
            &self.gender,
            &self.college,
            &self.semester,
            &self.state,
        ]
        .iter()
        .all(|field| field.as_deref().is_some_and(|v| !v.trim().is_empty()))
    }

    pub fn apply_details(&mut self, details: StudentDetails) {
        self.name = Some(details.name);
        self.gender = Some(details.gender);
        self.university_id = details.university_id;
        self.college = Some(details.college);
        self.semester = Some(details.semester);
        self.state = Some(details.state);
    }
}

/// Form body posted to `/sixways/save_student_details`.
///
/// Every field defaults to empty so a partial form still reaches validation
/// and can be re-rendered with messages.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StudentDetailsForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub university_id: String,
    #[serde(default)]
    pub college: String,
    #[serde(default)]
    pub semester: String,
    #[serde(default)]
    pub state: String,
}

/// Validated student details.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentDetails {
    pub name: String,
    pub gender: String,
    pub university_id: Option<Uuid>,
    pub college: String,
    pub semester: String,
    pub state: String,
}

impl StudentDetailsForm {
    pub fn validate(&self) -> Result<StudentDetails, FieldErrors> {
        let mut errors = FieldErrors::new();
        let mut required = |field: &str, value: &str| {
            if value.trim().is_empty() {
                errors
                    .entry(field.to_string())
                    .or_default()
                    .push("can't be blank".to_string());
            }
        };
        required("name", &self.name);
        required("gender", &self.gender);
        required("college", &self.college);
        required("semester", &self.semester);
        required("state", &self.state);

        if !self.gender.trim().is_empty() && !GENDERS.contains(&self.gender.trim()) {
            errors
                .entry("gender".to_string())
                .or_default()
                .push("is not included in the list".to_string());
        }
        if !self.semester.trim().is_empty() && !SEMESTERS.contains(&self.semester.trim()) {
            errors
                .entry("semester".to_string())
                .or_default()
                .push("is not included in the list".to_string());
        }

        let university_id = match self.university_id.trim() {
            "" => None,
            raw => match Uuid::parse_str(raw) {
                Ok(id) => Some(id),
                Err(_) => {
                    errors
                        .entry("university_id".to_string())
                        .or_default()
                        .push("is invalid".to_string());
                    None
                }
            },
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(StudentDetails {
            name: self.name.trim().to_string(),
            gender: self.gender.trim().to_string(),
            university_id,
            college: self.college.trim().to_string(),
            semester: self.semester.trim().to_string(),
            state: self.state.trim().to_string(),
        })
    }
}
