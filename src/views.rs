//! Minimal server-rendered pages.
//!
//! Pages are plain HTML strings; every interpolated value goes through
//! `escape_html`.

use axum::response::Html;

use crate::error::FieldErrors;
use crate::models::mooc_student::{GENDERS, MoocStudent, SEMESTERS, StudentDetailsForm};

pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
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

fn layout(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{}</title></head>\n<body>\n{}\n</body>\n</html>\n",
        escape_html(title),
        body
    ))
}

pub fn stage_complete(stage_number: i32) -> Html<String> {
    layout(
        "Application stage complete",
        &format!(
            "<h1>Stage {} complete</h1>\n<p>Thank you! We have received your payment.</p>",
            stage_number
        ),
    )
}

pub fn six_ways_index() -> Html<String> {
    layout(
        "Six Ways",
        "<h1>Six Ways to Start Up</h1>\n<a href=\"/sixways/start\">Start the course</a>",
    )
}

pub fn six_ways_start(student: &MoocStudent) -> Html<String> {
    let name = student.name.as_deref().unwrap_or_default();
    layout(
        "Six Ways - Start",
        &format!(
            "<h1>Welcome, {}</h1>\n<a href=\"/sixways/chapter/1/1\">Chapter 1</a>",
            escape_html(name)
        ),
    )
}

/// Content page for one chapter section, named `chapter_{id}_{section}`.
pub fn six_ways_chapter(chapter: u32, section: u32) -> Html<String> {
    layout(
        &format!("Six Ways - Chapter {}", chapter),
        &format!(
            "<article id=\"chapter_{chapter}_{section}\">\n<h1>Chapter {chapter}, Section {section}</h1>\n</article>"
        ),
    )
}

fn select(name: &str, options: &[&str], selected: &str) -> String {
    let mut html = format!("<select name=\"{}\">\n<option value=\"\"></option>\n", name);
    for option in options {
        let attr = if *option == selected { " selected" } else { "" };
        html.push_str(&format!(
            "<option value=\"{0}\"{1}>{0}</option>\n",
            escape_html(option),
            attr
        ));
    }
    html.push_str("</select>");
    html
}

/// Student details form, pre-filled with `form` and listing `errors`.
pub fn student_details(form: &StudentDetailsForm, errors: &FieldErrors) -> Html<String> {
    let mut body = String::from("<h1>Tell us about yourself</h1>\n");

    if !errors.is_empty() {
        body.push_str("<ul class=\"errors\">\n");
        for (field, messages) in errors {
            for message in messages {
                body.push_str(&format!(
                    "<li>{} {}</li>\n",
                    escape_html(&field.replace('_', " ")),
                    escape_html(message)
                ));
            }
        }
        body.push_str("</ul>\n");
    }

    body.push_str("<form method=\"post\" action=\"/sixways/save_student_details\">\n");
    for (name, value) in [
        ("name", &form.name),
        ("university_id", &form.university_id),
        ("college", &form.college),
        ("state", &form.state),
    ] {
        body.push_str(&format!(
            "<input type=\"text\" name=\"{}\" value=\"{}\">\n",
            name,
            escape_html(value)
        ));
    }
    body.push_str(&select("gender", GENDERS, &form.gender));
    body.push('\n');
    body.push_str(&select("semester", SEMESTERS, &form.semester));
    body.push_str("\n<button type=\"submit\">Save</button>\n</form>");

    layout("Six Ways - Student details", &body)
}

impl From<&MoocStudent> for StudentDetailsForm {
    fn from(student: &MoocStudent) -> Self {
        Self {
            name: student.name.clone().unwrap_or_default(),
            gender: student.gender.clone().unwrap_or_default(),
            university_id: student
                .university_id
                .map(|id| id.to_string())
                .unwrap_or_default(),
            college: student.college.clone().unwrap_or_default(),
            semester: student.semester.clone().unwrap_or_default(),
            state: student.state.clone().unwrap_or_default(),
        }
    }
}
