//! HTML pages served by the web handlers.
//!
//! Pages are small and static enough to assemble with `format!`. Every value
//! that came from a user passes through [`escape`].

use std::fmt::Write as _;

use crate::record::{Field, HandoverRecord, Section};

/// Escape text for inclusion in HTML element content or attribute values.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n\
         <html lang=\"en\">\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <title>{title}</title>\n\
         <style>\n\
         body {{ font-family: sans-serif; margin: 2em auto; max-width: 60em; }}\n\
         table {{ border-collapse: collapse; }}\n\
         th, td {{ border: 1px solid #999; padding: 0.3em 0.6em; text-align: left; }}\n\
         label {{ display: block; margin-top: 0.6em; }}\n\
         </style>\n\
         </head>\n\
         <body>\n\
         <nav><a href=\"/\">New handover</a> | <a href=\"/records\">Records</a></nav>\n\
         {body}\n\
         </body>\n\
         </html>\n",
        title = escape(title),
    )
}

fn input(field: Field) -> String {
    let key = field.key();
    let label = escape(field.label());
    if field.is_multiline() {
        format!("<label for=\"{key}\">{label}</label>\n<textarea id=\"{key}\" name=\"{key}\" rows=\"3\" cols=\"60\"></textarea>\n")
    } else {
        let kind = match field {
            Field::Date | Field::AssetReceiptDate | Field::ReturnDate => "date",
            _ => "text",
        };
        format!("<label for=\"{key}\">{label}</label>\n<input type=\"{kind}\" id=\"{key}\" name=\"{key}\">\n")
    }
}

/// The empty submission form.
#[must_use]
pub fn form() -> String {
    let mut body = String::from("<h1>IT Asset Handover Form</h1>\n<form method=\"post\" action=\"/\">\n");

    for (section, legend) in [
        (Section::Header, None),
        (Section::Employee, Some("Employee Information")),
        (Section::Asset, Some("Asset Information")),
    ] {
        body.push_str("<fieldset>\n");
        if let Some(legend) = legend {
            let _ = writeln!(body, "<legend>{legend}</legend>");
        }
        for field in Field::in_section(section) {
            body.push_str(&input(field));
        }
        body.push_str("</fieldset>\n");
    }

    body.push_str("<p><button type=\"submit\">Submit</button></p>\n</form>");
    page("IT Asset Handover Form", &body)
}

/// Confirmation shown after a successful submission.
#[must_use]
pub fn submitted(record: &HandoverRecord) -> String {
    let id = record.id;
    let body = format!(
        "<h1>Form submitted successfully</h1>\n\
         <p>Handover record {id} was saved.</p>\n\
         <p><a href=\"/record/{id}/pdf\">Download PDF</a> | <a href=\"/\">Submit another</a></p>"
    );
    page("Submitted", &body)
}

/// Table of all records with a PDF link each.
#[must_use]
pub fn records(records: &[HandoverRecord]) -> String {
    let columns = [
        Field::Date,
        Field::EmployeeName,
        Field::Department,
        Field::ItemName,
        Field::Serial,
    ];

    let mut body = String::from("<h1>Handover Records</h1>\n");
    if records.is_empty() {
        body.push_str("<p>No records yet.</p>");
        return page("Handover Records", &body);
    }

    body.push_str("<table>\n<tr><th>ID</th>");
    for field in columns {
        let _ = write!(body, "<th>{}</th>", escape(field.label()));
    }
    body.push_str("<th>Document</th></tr>\n");

    for record in records {
        let _ = write!(body, "<tr><td>{}</td>", record.id);
        for field in columns {
            let _ = write!(body, "<td>{}</td>", escape(record.text(field)));
        }
        let _ = writeln!(
            body,
            "<td><a href=\"/record/{}/pdf\">PDF</a></td></tr>",
            record.id
        );
    }
    body.push_str("</table>");

    page("Handover Records", &body)
}

/// Page for anything that does not exist.
#[must_use]
pub fn not_found(message: &str) -> String {
    let body = format!("<h1>Not found</h1>\n<p>{}</p>", escape(message));
    page("Not found", &body)
}

/// Generic failure page. Details stay in the server log.
#[must_use]
pub fn failure() -> String {
    page(
        "Error",
        "<h1>Something went wrong</h1>\n<p>The request could not be completed. Please try again later.</p>",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::HandoverFields;

    #[test]
    fn test_escape() {
        assert_eq!(
            escape("<b>\"Tom\" & 'Jerry'</b>"),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn test_form_has_every_field() {
        let html = form();
        for field in Field::ALL {
            assert!(
                html.contains(&format!("name=\"{}\"", field.key())),
                "missing input for {field}"
            );
        }
        assert!(html.contains("<textarea id=\"notes\""));
        assert!(html.contains("type=\"date\" id=\"return_date\""));
    }

    #[test]
    fn test_records_escapes_values_and_links_pdf() {
        let record = HandoverRecord {
            id: 9,
            created_at: None,
            fields: HandoverFields::default().with(Field::EmployeeName, "<script>x</script>"),
        };
        let html = records(&[record]);

        assert!(html.contains("&lt;script&gt;x&lt;/script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("href=\"/record/9/pdf\""));
    }

    #[test]
    fn test_records_empty() {
        assert!(records(&[]).contains("No records yet."));
    }

    #[test]
    fn test_submitted_names_id() {
        let record = HandoverRecord {
            id: 4,
            created_at: None,
            fields: HandoverFields::default(),
        };
        let html = submitted(&record);
        assert!(html.contains("Handover record 4 was saved."));
        assert!(html.contains("/record/4/pdf"));
    }
}
