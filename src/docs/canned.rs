use chrono::{DateTime, NaiveDate, Utc};

use super::types::DocumentRecord;

fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .unwrap_or_default()
}

/// The five sample pages served while no search connection is active.
/// Page URLs hang off `base_url`.
pub fn sample_documents(base_url: &str) -> Vec<DocumentRecord> {
    let base = base_url.trim_end_matches('/');
    let page = |space: &str, id: &str| format!("{}/spaces/{}/pages/{}", base, space, id);

    vec![
        DocumentRecord {
            id: "1".to_string(),
            title: "Security Framework Implementation Guide".to_string(),
            content: "Comprehensive guide for implementing security frameworks across internal systems. \
                      Includes best practices for access control, encryption, and monitoring protocols."
                .to_string(),
            author: "Security Team".to_string(),
            space: "Security".to_string(),
            last_modified: day(2024, 1, 15),
            url: page("SEC", "123456"),
        },
        DocumentRecord {
            id: "2".to_string(),
            title: "FCRA Compliance Procedures".to_string(),
            content: "Detailed procedures for maintaining FCRA compliance in credit reporting operations. \
                      Covers data accuracy, consumer rights, and dispute resolution processes."
                .to_string(),
            author: "Compliance Team".to_string(),
            space: "Compliance".to_string(),
            last_modified: day(2024, 1, 10),
            url: page("COMP", "789012"),
        },
        DocumentRecord {
            id: "3".to_string(),
            title: "API Integration Standards".to_string(),
            content: "Technical standards and guidelines for API integration with internal systems. \
                      Includes authentication, error handling, and performance requirements."
                .to_string(),
            author: "Engineering Team".to_string(),
            space: "Engineering".to_string(),
            last_modified: day(2024, 1, 8),
            url: page("ENG", "345678"),
        },
        DocumentRecord {
            id: "4".to_string(),
            title: "Identity Verification Workflow".to_string(),
            content: "Standard operating procedures for consumer identity verification processes. \
                      Includes document validation, fraud detection, and escalation procedures."
                .to_string(),
            author: "Operations Team".to_string(),
            space: "Operations".to_string(),
            last_modified: day(2024, 1, 5),
            url: page("OPS", "901234"),
        },
        DocumentRecord {
            id: "5".to_string(),
            title: "Data Breach Response Protocol".to_string(),
            content: "Emergency procedures and escalation paths for security incidents. \
                      Includes notification requirements, containment procedures, and recovery steps."
                .to_string(),
            author: "Incident Response Team".to_string(),
            space: "Security".to_string(),
            last_modified: day(2023, 12, 28),
            url: page("SEC", "567890"),
        },
    ]
}

/// Case-insensitive substring match on title, content or space.
pub fn filter_documents(docs: Vec<DocumentRecord>, query: &str) -> Vec<DocumentRecord> {
    let needle = query.trim().to_lowercase();
    docs.into_iter()
        .filter(|d| {
            d.title.to_lowercase().contains(&needle)
                || d.content.to_lowercase().contains(&needle)
                || d.space.to_lowercase().contains(&needle)
        })
        .collect()
}
