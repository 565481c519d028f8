//! Built-in sample catalog loaded on every process start.

use crate::blueprint::Blueprint;
use crate::contract::Contract;
use crate::field::{FieldDefinition, FieldType, FieldValue, FieldValues};
use crate::store::StoreState;
use chrono::{DateTime, Duration, Utc};
use contractflow_ids::{BlueprintId, ContractId, FieldId};
use contractflow_lifecycle::{ContractStatus, Lifecycle, LifecycleHistoryError, StatusChange};

pub const NDA_BLUEPRINT_ID: &str = "bp_1";
pub const FREELANCE_BLUEPRINT_ID: &str = "bp_2";
pub const SIGNED_NDA_CONTRACT_ID: &str = "ct_1";
pub const WEBSITE_CONTRACT_ID: &str = "ct_2";

fn fid(id: &'static str) -> FieldId {
    FieldId::from_static(id)
}

fn values(entries: Vec<(&'static str, FieldValue)>) -> FieldValues {
    entries.into_iter().map(|(id, v)| (fid(id), v)).collect()
}

fn nda_blueprint(now: DateTime<Utc>) -> Blueprint {
    Blueprint {
        id: BlueprintId::from_static(NDA_BLUEPRINT_ID),
        name: "Non-Disclosure Agreement (NDA)".to_string(),
        description: "Standard mutual NDA for contractors and employees.".to_string(),
        created_at: now,
        fields: vec![
            FieldDefinition::required(fid("f_1"), FieldType::Text, "Party A Name")
                .with_placeholder("Company Name"),
            FieldDefinition::required(fid("f_2"), FieldType::Text, "Party B Name")
                .with_placeholder("Recipient Name"),
            FieldDefinition::required(fid("f_3"), FieldType::Date, "Effective Date"),
            FieldDefinition::optional(fid("f_4"), FieldType::Checkbox, "Include Non-Compete Clause"),
            FieldDefinition::required(fid("f_5"), FieldType::Signature, "Party B Signature"),
        ],
    }
}

fn freelance_blueprint(now: DateTime<Utc>) -> Blueprint {
    Blueprint {
        id: BlueprintId::from_static(FREELANCE_BLUEPRINT_ID),
        name: "Freelance Service Agreement".to_string(),
        description: "Contract for freelance design and development work.".to_string(),
        created_at: now,
        fields: vec![
            FieldDefinition::required(fid("f_1"), FieldType::Text, "Client Name"),
            FieldDefinition::required(fid("f_2"), FieldType::Text, "Project Scope")
                .with_placeholder("Brief description of work"),
            FieldDefinition::required(fid("f_3"), FieldType::Number, "Total Fee ($)"),
            FieldDefinition::required(fid("f_4"), FieldType::Date, "Delivery Date"),
            FieldDefinition::required(fid("f_5"), FieldType::Signature, "Freelancer Signature"),
            FieldDefinition::required(fid("f_6"), FieldType::Signature, "Client Signature"),
        ],
    }
}

/// Sample blueprints and contracts, timestamped relative to `now`.
pub fn sample_state(now: DateTime<Utc>) -> Result<StoreState, LifecycleHistoryError> {
    let nda = nda_blueprint(now);
    let freelance = freelance_blueprint(now);
    let days_ago = |n: i64| now - Duration::days(n);

    let signed_nda = Contract::from_parts(
        ContractId::from_static(SIGNED_NDA_CONTRACT_ID),
        &nda,
        "NDA - Nawneet Kumar",
        Lifecycle::from_history(vec![
            StatusChange::new(ContractStatus::Created, days_ago(5)),
            StatusChange::new(ContractStatus::Approved, days_ago(4)),
            StatusChange::new(ContractStatus::Sent, days_ago(3)),
            StatusChange::new(ContractStatus::Signed, days_ago(2)),
        ])?,
        values(vec![
            ("f_1", "Acme Corp".into()),
            ("f_2", "Nawneet Kumar".into()),
            ("f_3", "2024-05-01".into()),
            ("f_4", true.into()),
            ("f_5", "Signed by Nawneet Kumar".into()),
        ]),
        days_ago(2),
    );

    let website = Contract::from_parts(
        ContractId::from_static(WEBSITE_CONTRACT_ID),
        &freelance,
        "Website Redesign Project",
        Lifecycle::from_history(vec![
            StatusChange::new(ContractStatus::Created, days_ago(1)),
            StatusChange::new(ContractStatus::Approved, now - Duration::hours(1)),
        ])?,
        values(vec![
            ("f_1", "TechStart Inc".into()),
            (
                "f_2",
                "Full website redesign including homepage and about page.".into(),
            ),
            ("f_3", "5000".into()),
            ("f_4", "2024-06-15".into()),
        ]),
        now - Duration::hours(1),
    );

    Ok(StoreState {
        blueprints: vec![nda, freelance],
        contracts: vec![signed_nda, website],
    })
}
