//! Educational agreement assembly.
//!
//! The agreement is six ordered parts. Parts one to four and six are
//! fragment templates on disk; part five ("Address for Service") is
//! generated from the application's applicants.

use std::path::Path;

use crate::error::AppError;
use crate::models::application::BatchApplicant;
use crate::store::IncubatorStore;
use uuid::Uuid;

const SERVICE_PROVIDER_NAME: &str = "Sanjay Vijayakumar";
const SERVICE_PROVIDER_DESIGNATION: &str = "Chief Executive Officer";
const SERVICE_PROVIDER_ADDRESS: &str = "SV.CO DIGITAL PLATFORM PRIVATE LIMITED, Fourth Floor, \
    Bhageeratha Square, Banerji Road, Kacherippady, Ernakulam North, Cochin - 682018";
const SERVICE_PROVIDER_EMAIL: &str = "help@sv.co";

/// One part of the agreement, in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Part {
    Fragment(&'static str),
    AddressForService,
}

const PARTS: [Part; 6] = [
    Part::Fragment("part_one.txt"),
    Part::Fragment("part_two.txt"),
    Part::Fragment("part_three.txt"),
    Part::Fragment("part_four.txt"),
    Part::AddressForService,
    Part::Fragment("part_six.txt"),
];

/// A party block under "Address for Service".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartyDetails {
    pub title: String,
    pub name: String,
    pub designation: String,
    pub address: String,
    pub email: String,
}

impl PartyDetails {
    fn for_applicant(title: String, applicant: &BatchApplicant) -> Self {
        Self {
            title,
            name: applicant.name.clone(),
            designation: applicant.designation(),
            address: applicant.current_address.clone().unwrap_or_default(),
            email: applicant.email.clone(),
        }
    }

    fn render(&self) -> String {
        format!(
            "{}\nName: {}\nDesignation: {}\nAddress: {}\nEmail: {}",
            self.title, self.name, self.designation, self.address, self.email
        )
    }
}

/// Parties listed under clause 8.2: the service provider, the startup
/// (represented by its team lead), then every founder numbered from 1.
pub fn address_for_service_parties(
    team_lead: &BatchApplicant,
    applicants: &[BatchApplicant],
) -> Vec<PartyDetails> {
    let mut parties = vec![
        PartyDetails {
            title: "Service Provider".to_string(),
            name: SERVICE_PROVIDER_NAME.to_string(),
            designation: SERVICE_PROVIDER_DESIGNATION.to_string(),
            address: SERVICE_PROVIDER_ADDRESS.to_string(),
            email: SERVICE_PROVIDER_EMAIL.to_string(),
        },
        PartyDetails::for_applicant("Startup".to_string(), team_lead),
    ];
    parties.extend(
        applicants
            .iter()
            .enumerate()
            .map(|(index, applicant)| {
                PartyDetails::for_applicant(format!("Founder {}", index + 1), applicant)
            }),
    );
    parties
}

fn render_address_for_service(parties: &[PartyDetails]) -> String {
    let mut section = String::from("8.2 Address for Service");
    for party in parties {
        section.push_str("\n\n");
        section.push_str(&party.render());
    }
    section
}

/// Replace `{{name}}` placeholders.
fn render_fragment(template: &str, vars: &[(&str, &str)]) -> String {
    vars.iter().fold(template.to_string(), |text, (name, value)| {
        text.replace(&format!("{{{{{}}}}}", name), value)
    })
}

/// Build the full agreement text for an application.
///
/// # Errors
///
/// - `ApplicationNotFound`: unknown application
/// - `Internal`: a fragment is missing or the application data is incomplete
pub async fn build_agreement(
    store: &dyn IncubatorStore,
    fragments_dir: &Path,
    batch_application_id: Uuid,
) -> Result<String, AppError> {
    let application = store
        .batch_application(batch_application_id)
        .await?
        .ok_or(AppError::ApplicationNotFound)?;
    let team_lead = store
        .batch_applicant(application.team_lead_id)
        .await?
        .ok_or_else(|| AppError::Internal("Application has no team lead".to_string()))?;
    let batch = store
        .batch(application.batch_id)
        .await?
        .ok_or_else(|| AppError::Internal("Application has no batch".to_string()))?;
    let applicants = store.batch_applicants(application.id).await?;

    let fee = format!("{:.2}", application.fee);
    let vars = [
        ("team_lead_name", team_lead.name.as_str()),
        ("batch_name", batch.name.as_str()),
        ("fee", fee.as_str()),
    ];

    let mut sections = Vec::with_capacity(PARTS.len());
    for part in PARTS {
        let section = match part {
            Part::Fragment(file) => {
                let path = fragments_dir.join(file);
                let template = tokio::fs::read_to_string(&path).await.map_err(|e| {
                    AppError::Internal(format!(
                        "Agreement fragment {} unreadable: {}",
                        path.display(),
                        e
                    ))
                })?;
                render_fragment(template.trim_end(), &vars)
            }
            Part::AddressForService => render_address_for_service(
                &address_for_service_parties(&team_lead, &applicants),
            ),
        };
        sections.push(section);
    }

    Ok(sections.join("\n\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn applicant(name: &str, role: &str) -> BatchApplicant {
        BatchApplicant {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            role: role.to_string(),
            current_address: Some("Kochi".to_string()),
        }
    }

    #[test]
    fn test_parties_in_order() {
        let lead = applicant("Asha", "product");
        let other = applicant("Ravi", "engineering");
        let parties = address_for_service_parties(&lead, &[lead.clone(), other]);

        let titles: Vec<_> = parties.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(
            titles,
            ["Service Provider", "Startup", "Founder 1", "Founder 2"]
        );
        assert_eq!(parties[1].designation, "Product Lead");
        assert_eq!(parties[3].name, "Ravi");
        assert_eq!(parties[3].designation, "Engineering Lead");
    }

    #[test]
    fn test_render_fragment_substitutes_placeholders() {
        let text = render_fragment(
            "Fee of INR {{fee}} for {{team_lead_name}}, {{unknown}}",
            &[("fee", "3000.00"), ("team_lead_name", "Asha")],
        );
        assert_eq!(text, "Fee of INR 3000.00 for Asha, {{unknown}}");
    }

    #[test]
    fn test_address_for_service_heading() {
        let lead = applicant("Asha", "product");
        let text = render_address_for_service(&address_for_service_parties(&lead, &[]));

        assert!(text.starts_with("8.2 Address for Service\n\nService Provider\n"));
        assert!(text.contains("Email: asha@example.com"));
    }
}
