use std::fmt::Write;

use crate::benchmarks::MarketSummary;
use crate::models::CompensationRecord;

pub const LABOUR_LAW_SYSTEM_PROMPT: &str = "You are a Romanian Labor Law expert assistant. \
Answer only from established Romanian labor legislation (Law 53/2003 Labor Code and related acts). \
Always cite the legal reference, keep answers concise with bullet points, answer in English, \
and end with: \"This is general information, not legal advice.\" \
If you do not know, recommend the Romanian Labor Inspectorate or a labor law specialist.";

pub const MARKET_ANALYSIS_SYSTEM_PROMPT: &str = "You are a compensation analysis expert specializing in Romanian market data. \
Format your response in markdown with ## sections, **bold** key numbers and bullet points. \
Cover market position, salary analysis, benefits comparison, career recommendations and location insights. \
Be direct, data-driven and actionable.";

pub const ANALYSIS_REQUEST: &str = "Provide a comprehensive market analysis with specific recommendations.";

const NO_SUBMISSION: &str = "User has not submitted compensation data yet. Encourage them to complete their \
profile in the Total Rewards tab first, then come back for analysis.";

const NO_MARKET_DATA: &str = "Limited market data available.";

/// Describes the user's own submission for the analysis prompt.
pub fn user_context(user: Option<&CompensationRecord>) -> String {
    let Some(user) = user else {
        return NO_SUBMISSION.to_string();
    };

    let mut benefits = Vec::new();
    if user.meal_vouchers() {
        benefits.push(format!("Meal Vouchers ({} RON)", user.meal_vouchers_value.unwrap_or(0.0)));
    }
    if user.health_insurance() {
        benefits.push("Health Insurance".to_string());
    }
    if user.life_insurance() {
        benefits.push("Life Insurance".to_string());
    }

    let mut out = String::from("User's Data:\n");
    // Writing to a String cannot fail
    let _ = writeln!(out, "- Gross Salary: {} RON", user.gross_salary);
    let _ = writeln!(out, "- Net Salary: {} RON", user.net_salary);
    let _ = writeln!(out, "- Job Title: {}", user.job_title);
    let _ = writeln!(out, "- Experience Level: {}", user.experience_level);
    let _ = writeln!(out, "- Industry: {}", user.industry);
    let _ = writeln!(out, "- City: {}", user.city);
    let _ = writeln!(out, "- Company Size: {}", user.company_size);
    let _ = writeln!(out, "- Benefits: {}", if benefits.is_empty() { "none".to_string() } else { benefits.join(", ") });
    out.push_str("\nUSER HAS SUBMITTED THEIR DATA. Provide detailed analysis.");
    out
}

pub fn market_context(summary: Option<&MarketSummary>) -> String {
    match summary {
        Some(s) => format!(
            "Market Data ({} entries):\nAverage Gross: {} RON\nRange: {} - {} RON",
            s.entries, s.average_gross, s.min_gross, s.max_gross
        ),
        None => NO_MARKET_DATA.to_string(),
    }
}

pub fn analysis_prompt(user: Option<&CompensationRecord>, summary: Option<&MarketSummary>) -> String {
    format!("{}\n\n{}\n\n{}", user_context(user), market_context(summary), ANALYSIS_REQUEST)
}
