//! Mentoring directory option sets and display helpers.
//!
//! Mentor sign-up forms offer fixed choices for compensation band, time
//! donation and availability. Each choice has a human label and a stable
//! value stored on the mentor record.

use serde::Serialize;

/// A label/value pair for a select input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub label: &'static str,
    pub value: &'static str,
}

const fn option(label: &'static str, value: &'static str) -> SelectOption {
    SelectOption { label, value }
}

pub const COST_TO_COMPANY: &[SelectOption] = &[
    option("Less than 3 lakh", "below_3l"),
    option("Between 3 lakh and 6 lakh", "between_3l_and_6l"),
    option("Between 6 lakh and 12 lakh", "between_6l_and_12l"),
    option("Between 12 lakh and 36 lakh", "between_12l_and_36l"),
    option("Between 36 lakh and 1 crore", "between_36l_and_1cr"),
    option("More than 1 crore", "above_1cr"),
];

pub const TIME_DONATE_PERCENTAGE: &[SelectOption] = &[
    option("0%", "0"),
    option("25%", "25"),
    option("50%", "50"),
    option("75%", "75"),
    option("100%", "100"),
];

pub const AVAILABILITY_DAYS: &[SelectOption] = &[
    option("Every day", "everyday"),
    option("Weekdays", "weekdays"),
    option("Weekends", "weekends"),
];

pub const AVAILABILITY_TIME: &[SelectOption] = &[
    option("All day", "all_day"),
    option("Morning", "morning"),
    option("Midday", "midday"),
    option("Afternoon", "afternoon"),
    option("Evening", "evening"),
];

pub const SKILL_EXPERTISE: &[SelectOption] = &[
    option("Intermediate", "intermediate"),
    option("Advanced", "advanced"),
    option("Expert", "expert"),
];

/// Every option set used by the mentor forms.
#[derive(Debug, Serialize)]
pub struct MentoringOptions {
    pub cost_to_company: &'static [SelectOption],
    pub time_donate_percentage: &'static [SelectOption],
    pub availability_days: &'static [SelectOption],
    pub availability_time: &'static [SelectOption],
    pub skill_expertise: &'static [SelectOption],
}

impl MentoringOptions {
    pub fn all() -> Self {
        Self {
            cost_to_company: COST_TO_COMPANY,
            time_donate_percentage: TIME_DONATE_PERCENTAGE,
            availability_days: AVAILABILITY_DAYS,
            availability_time: AVAILABILITY_TIME,
            skill_expertise: SKILL_EXPERTISE,
        }
    }
}

/// Human label for a meeting status, e.g. `"not_started"` -> `"Not started"`.
pub fn meeting_status_label(status: &str) -> String {
    super::application::capitalize(&status.replace('_', " "))
}

/// Badge markup for each availability day, e.g. `"monday"` -> `MON`.
pub fn day_badges<S: AsRef<str>>(days: &[S]) -> String {
    days.iter()
        .map(|day| {
            let short: String = day.as_ref().chars().take(3).collect();
            format!("<span class='badge'>{}</span>", short.to_uppercase())
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meeting_status_label() {
        assert_eq!(meeting_status_label("not_started"), "Not started");
        assert_eq!(meeting_status_label("COMPLETED"), "Completed");
    }

    #[test]
    fn test_day_badges() {
        assert_eq!(
            day_badges(&["monday", "saturday"]),
            "<span class='badge'>MON</span> <span class='badge'>SAT</span>"
        );
        assert_eq!(day_badges::<&str>(&[]), "");
    }

    #[test]
    fn test_option_sets_have_unique_values() {
        for set in [
            COST_TO_COMPANY,
            TIME_DONATE_PERCENTAGE,
            AVAILABILITY_DAYS,
            AVAILABILITY_TIME,
            SKILL_EXPERTISE,
        ] {
            let mut values: Vec<_> = set.iter().map(|o| o.value).collect();
            values.sort_unstable();
            values.dedup();
            assert_eq!(values.len(), set.len());
        }
    }
}
