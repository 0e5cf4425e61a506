use crate::domain::model::ContactMessage;
use crate::utils::error::Result;
use std::io::Write;

const HEADER: [&str; 6] = ["id", "name", "email", "subject", "message", "createdAt"];

/// Write messages as CSV with a header row. Returns the number of data rows.
pub fn write_csv<W: Write>(messages: &[ContactMessage], writer: W) -> Result<usize> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(HEADER)?;

    for message in messages {
        csv_writer.write_record([
            message.id.to_string(),
            message.name.clone(),
            message.email.clone(),
            message.subject.clone(),
            message.message.clone(),
            message.created_at.to_rfc3339(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(messages.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_write_csv_quotes_embedded_commas() {
        let messages = vec![ContactMessage {
            id: 7,
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            subject: "Hello, again".to_string(),
            message: "Line one\nline two".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        }];

        let mut out = Vec::new();
        let rows = write_csv(&messages, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(rows, 1);
        assert!(text.starts_with("id,name,email,subject,message,createdAt\n"));
        assert!(text.contains("7,Ada,ada@example.com,\"Hello, again\",\"Line one\nline two\",2024-05-01T12:00:00+00:00"));
    }
}
