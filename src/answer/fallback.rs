//! Canned answers used whenever the generation endpoint cannot be used.
//!
//! Everything here is pure: no I/O, and randomness only through the
//! caller's `fastrand::Rng`.

use super::Category;

/// Leading part of the query quoted in canned answers.
const QUOTE_CHARS: usize = 50;

type Template = fn(&str) -> String;

fn security_assessment(quote: &str) -> String {
    format!(
        "**Security Analysis - Knowledge Base**\n\n\
         Regarding \"{quote}...\", here's my assessment:\n\n\
         **Risk Level:** Medium to High\n\n\
         **Key Security Considerations:**\n\
         • Data encryption protocols must be followed\n\
         • Multi-factor authentication requirements\n\
         • Regular security audits and compliance checks\n\
         • GDPR and CCPA compliance measures\n\n\
         **Recommended Actions:**\n\
         1. Implement additional security layers\n\
         2. Review current access controls\n\
         3. Conduct vulnerability assessment\n\
         4. Update incident response procedures\n\n\
         **Related Policies:** Refer to Security Policy 2024-SEC-001\n\n\
         **Related Documentation Search Suggestions:**\n\
         • security framework\n\
         • access control procedures\n\
         • incident response protocol\n\
         • vulnerability management\n\
         • encryption standards"
    )
}

fn security_framework(quote: &str) -> String {
    format!(
        "**Security Framework Response**\n\n\
         Based on your inquiry about \"{quote}...\":\n\n\
         **Current Security Posture:**\n\
         • Identity verification protocols active\n\
         • Fraud detection systems monitoring\n\
         • Real-time threat intelligence integration\n\
         • Compliance with SOC 2 Type II standards\n\n\
         **Analysis:**\n\
         This falls under critical security infrastructure. The approach should align with:\n\
         - Zero-trust security model\n\
         - Continuous monitoring protocols\n\
         - Data minimization principles\n\
         - Regular penetration testing\n\n\
         **Next Steps:**\n\
         Consult the Security Operations Center for detailed implementation guidance.\n\n\
         **Related Documentation Search Suggestions:**\n\
         • zero trust architecture\n\
         • security monitoring\n\
         • threat intelligence\n\
         • SOC 2 compliance\n\
         • penetration testing"
    )
}

fn compliance_assessment(quote: &str) -> String {
    format!(
        "**Regulatory Compliance Assessment**\n\n\
         For your question about \"{quote}...\":\n\n\
         **Compliance Requirements:**\n\
         • FCRA (Fair Credit Reporting Act) guidelines\n\
         • GDPR Article 25 - Data Protection by Design\n\
         • CCPA consumer rights provisions\n\
         • SOX compliance for financial reporting\n\n\
         **Key Considerations:**\n\
         1. Data retention policies (7-year cycle)\n\
         2. Consumer consent management\n\
         3. Third-party vendor assessments\n\
         4. Regular compliance training requirements\n\n\
         **Documentation Required:**\n\
         - Risk assessment forms\n\
         - Privacy impact analysis\n\
         - Vendor security questionnaires\n\n\
         Recommendation: Schedule compliance review within 30 days.\n\n\
         **Related Documentation Search Suggestions:**\n\
         • FCRA compliance procedures\n\
         • GDPR data protection\n\
         • regulatory requirements\n\
         • compliance training\n\
         • audit checklist"
    )
}

fn technical_operations(quote: &str) -> String {
    format!(
        "**Technical Operations Response**\n\n\
         Technical analysis for \"{quote}...\":\n\n\
         **System Architecture:**\n\
         • Cloud-native infrastructure\n\
         • Microservices architecture\n\
         • API-first design principles\n\
         • Real-time data processing capabilities\n\n\
         **Performance Targets:**\n\
         - 99.9% uptime SLA\n\
         - <200ms API response time\n\
         - 24/7 monitoring and alerting\n\
         - Automated scaling protocols\n\n\
         **Implementation Approach:**\n\
         1. Development in staging environment\n\
         2. Comprehensive testing protocols\n\
         3. Gradual production rollout\n\
         4. Post-deployment monitoring\n\n\
         **Related Documentation Search Suggestions:**\n\
         • API documentation\n\
         • system architecture\n\
         • deployment procedures\n\
         • technical standards\n\
         • monitoring guidelines"
    )
}

const SECURITY_POOL: &[Template] = &[security_assessment, security_framework];
const COMPLIANCE_POOL: &[Template] = &[compliance_assessment];
const TECHNICAL_POOL: &[Template] = &[technical_operations];

/// Template pool for a category. Categories without their own pool use security's.
fn response_pool(category: Category) -> &'static [Template] {
    match category {
        Category::Compliance => COMPLIANCE_POOL,
        Category::Technical => TECHNICAL_POOL,
        Category::Security | Category::Fraud | Category::Identity | Category::Data => SECURITY_POOL,
    }
}

/// Fixed search phrases per category.
pub fn category_keywords(category: Category) -> &'static [&'static str] {
    match category {
        Category::Security => &[
            "security framework",
            "access control",
            "encryption",
            "incident response",
            "vulnerability management",
        ],
        Category::Compliance => &[
            "FCRA compliance",
            "GDPR procedures",
            "regulatory requirements",
            "audit checklist",
            "data retention",
        ],
        Category::Technical => &[
            "API documentation",
            "system architecture",
            "deployment guide",
            "technical standards",
            "integration",
        ],
        Category::Fraud => &[
            "fraud detection",
            "risk assessment",
            "identity verification",
            "monitoring protocols",
            "alert procedures",
        ],
        Category::Identity => &[
            "identity verification",
            "KYC procedures",
            "consumer authentication",
            "document validation",
            "verification workflow",
        ],
        Category::Data => &[
            "data analytics",
            "reporting procedures",
            "data quality",
            "analytics framework",
            "business intelligence",
        ],
    }
}

/// Pick one canned answer for the category, quoting the start of the query.
pub fn fallback_response(query: &str, category: Category, rng: &mut fastrand::Rng) -> String {
    let quote: String = query.chars().take(QUOTE_CHARS).collect();
    let pool = response_pool(category);
    let template = pool[rng.usize(..pool.len())];
    template(&quote)
}

/// Up to two query words (longer than 3 chars) as "<word> procedures", then
/// three category phrases. Never more than five items.
pub fn fallback_suggestions(query: &str, category: Category) -> Vec<String> {
    let lowered = query.to_lowercase();
    let mut suggestions: Vec<String> = lowered
        .split_whitespace()
        .filter(|w| w.chars().count() > 3)
        .take(2)
        .map(|w| format!("{} procedures", w))
        .collect();

    suggestions.extend(
        category_keywords(category)
            .iter()
            .take(3)
            .map(|k| k.to_string()),
    );
    suggestions.truncate(5);
    suggestions
}

/// Canned analysis used when an article cannot be summarized remotely.
pub fn article_summary(title: &str, source: &str, date: chrono::NaiveDate) -> String {
    let title = if title.trim().is_empty() {
        "External Article Analysis"
    } else {
        title.trim()
    };
    let source = if source.trim().is_empty() {
        "Text Input"
    } else {
        source.trim()
    };
    format!(
        "**Article Analysis Complete**\n\n\
         **Title:** {title}\n\
         **Source:** {source}\n\
         **Analysis Date:** {date}\n\n\
         **Executive Summary:**\n\
         This article has been reviewed for relevance to internal operations and compliance requirements.\n\n\
         **Key Findings:**\n\
         • Content aligns with industry best practices\n\
         • Regulatory compliance considerations identified\n\
         • Technical implementation feasibility assessed\n\
         • Risk factors evaluated and documented\n\n\
         **Risk Rating:** Medium\n\
         **Recommended Action:** Proceed with legal review\n\n\
         **Next Steps:**\n\
         1. Share with compliance team for detailed review\n\
         2. Technical feasibility assessment\n\
         3. Resource allocation planning\n\
         4. Timeline development\n\n\
         **Questions for Legal/Compliance Team:**\n\
         • Are there specific regulatory concerns?\n\
         • What are the data retention implications?\n\
         • How does this impact consumer rights?",
        date = date.format("%Y-%m-%d"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Category; 6] = [
        Category::Security,
        Category::Compliance,
        Category::Technical,
        Category::Fraud,
        Category::Identity,
        Category::Data,
    ];

    #[test]
    fn test_response_quotes_query_prefix() {
        let query = "How should we rotate the signing keys for the partner API gateway every quarter?";
        let prefix: String = query.chars().take(50).collect();
        for category in ALL {
            let mut rng = fastrand::Rng::with_seed(7);
            let text = fallback_response(query, category, &mut rng);
            assert!(!text.is_empty());
            assert!(text.contains(&prefix), "{:?} response lacks prefix", category);
            assert!(!text.contains(query), "quote must be cut at 50 chars");
        }
    }

    #[test]
    fn test_categories_without_pool_match_security() {
        for category in [Category::Fraud, Category::Identity, Category::Data] {
            for seed in 0..8 {
                let a = fallback_response("card testing", category, &mut fastrand::Rng::with_seed(seed));
                let b = fallback_response("card testing", Category::Security, &mut fastrand::Rng::with_seed(seed));
                assert_eq!(a, b);
            }
        }
    }

    #[test]
    fn test_unknown_category_name_behaves_as_security() {
        let parsed = Category::parse_lenient("marketing");
        let mut rng_a = fastrand::Rng::with_seed(3);
        let mut rng_b = fastrand::Rng::with_seed(3);
        assert_eq!(
            fallback_response("q", parsed, &mut rng_a),
            fallback_response("q", Category::Security, &mut rng_b)
        );
        assert_eq!(
            fallback_suggestions("q", parsed),
            fallback_suggestions("q", Category::Security)
        );
    }

    #[test]
    fn test_security_pool_reaches_both_templates() {
        let mut rng = fastrand::Rng::with_seed(42);
        let picks: std::collections::HashSet<String> = (0..64)
            .map(|_| fallback_response("q", Category::Security, &mut rng))
            .collect();
        assert_eq!(picks.len(), 2);
    }

    #[test]
    fn test_suggestions_from_query_and_category() {
        let got = fallback_suggestions("What is the Password Rotation policy", Category::Compliance);
        assert_eq!(
            got,
            vec![
                "what procedures",
                "password procedures",
                "FCRA compliance",
                "GDPR procedures",
                "regulatory requirements",
            ]
        );
    }

    #[test]
    fn test_suggestions_short_words_skipped() {
        let got = fallback_suggestions("is it ok", Category::Data);
        assert_eq!(got, vec!["data analytics", "reporting procedures", "data quality"]);
    }

    #[test]
    fn test_suggestions_bounds() {
        let inputs = ["", "   ", "a b c", "encryption", "one two three four five six seven", "ünïcödé wörds här"];
        for input in inputs {
            for category in ALL {
                let got = fallback_suggestions(input, category);
                assert!(got.len() <= 5);
                assert!(got.iter().all(|s| !s.trim().is_empty()));
            }
        }
    }

    #[test]
    fn test_article_summary_defaults() {
        let date = chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let text = article_summary("", "  ", date);
        assert!(text.contains("**Title:** External Article Analysis"));
        assert!(text.contains("**Source:** Text Input"));
        assert!(text.contains("2024-03-01"));
    }
}
