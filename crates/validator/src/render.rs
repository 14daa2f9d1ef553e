//! Output of a submission outcome
//!
//! A failed exchange is never printed as a status line, so it cannot be
//! mistaken for a negative verdict.

use clap::ValueEnum;
use philid_client::SubmissionOutcome;
use philid_common::VerificationResult;

#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable lines
    #[default]
    Table,
    /// The outcome as JSON
    Json,
}

pub fn render(outcome: &SubmissionOutcome, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Table => Ok(render_table(outcome)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(outcome)?),
    }
}

pub fn render_table(outcome: &SubmissionOutcome) -> String {
    match outcome {
        SubmissionOutcome::Succeeded { result, .. } => render_result(result),
        SubmissionOutcome::Failed { reason, .. } => {
            format!("Verification request failed: {}\n", reason)
        }
    }
}

/// Status and message always; identity fields only when the server sent them
pub fn render_result(result: &VerificationResult) -> String {
    let mut out = format!("Status: {}\nMessage: {}\n", result.status, result.message);

    if let Some(data) = &result.data {
        let rows = [
            ("ID Number", data.id_number.clone()),
            ("First Name", data.first_name.clone()),
            ("Middle Name", data.middle_name.clone().unwrap_or_default()),
            ("Last Name", data.last_name.clone()),
            ("Date of Birth", data.dob.clone()),
            ("Face Match", data.is_same_person.to_string()),
            ("Similarity", data.similarity.to_string()),
        ];
        for (label, value) in rows {
            out.push_str(&format!("{}: {}\n", label, value));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use philid_common::Error;

    fn outcome_from(body: &str) -> SubmissionOutcome {
        SubmissionOutcome::from_result(Ok(serde_json::from_str(body).unwrap()))
    }

    #[test]
    fn test_render_full_result() {
        let outcome = outcome_from(
            r#"{"status":"approved","message":"ok","data":{"id_number":"1234-5678","first_name":"Juan","middle_name":"Santos","last_name":"Dela Cruz","dob":"1990-01-01","is_same_person":true,"similarity":0.97}}"#,
        );

        let table = render_table(&outcome);
        assert_eq!(
            table,
            "Status: approved\n\
             Message: ok\n\
             ID Number: 1234-5678\n\
             First Name: Juan\n\
             Middle Name: Santos\n\
             Last Name: Dela Cruz\n\
             Date of Birth: 1990-01-01\n\
             Face Match: true\n\
             Similarity: 0.97\n"
        );
    }

    #[test]
    fn test_render_shows_service_encodings_verbatim() {
        let outcome = outcome_from(
            r#"{"status":"Success","data":{"id_number":"1234-5678-9012-3456","first_name":"JUAN","middle_name":null,"last_name":"DELA CRUZ","dob":"JANUARY 01, 1990","is_same_person":"True","similarity":"99.87%"}}"#,
        );

        let table = render_table(&outcome);
        assert!(table.contains("Message: \n"));
        assert!(table.contains("Middle Name: \n"));
        assert!(table.contains("Face Match: True\n"));
        assert!(table.contains("Similarity: 99.87%\n"));
    }

    #[test]
    fn test_render_without_data() {
        let outcome = outcome_from(r#"{"status":"rejected","message":"no match"}"#);
        assert_eq!(render_table(&outcome), "Status: rejected\nMessage: no match\n");
    }

    #[test]
    fn test_render_failure_has_no_status_line() {
        let outcome = SubmissionOutcome::from_result(Err(Error::Transport(
            "connection refused".to_string(),
        )));

        let table = render_table(&outcome);
        assert!(table.starts_with("Verification request failed:"));
        assert!(table.contains("connection refused"));
        assert!(!table.contains("Status:"));
    }

    #[test]
    fn test_render_json() {
        let outcome = outcome_from(r#"{"status":"rejected","message":"no match"}"#);
        let json: serde_json::Value =
            serde_json::from_str(&render(&outcome, OutputFormat::Json).unwrap()).unwrap();

        assert_eq!(json["outcome"], "succeeded");
        assert_eq!(json["result"]["status"], "rejected");
        assert_eq!(json["result"]["message"], "no match");
        assert!(json["result"].get("data").is_none());
    }
}
