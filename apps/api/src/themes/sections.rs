//! Section renderers shared by every built-in theme.
//!
//! Each function returns an empty string when its slice of the profile has no
//! data, so themes can concatenate sections without checking presence.

use crate::models::profile::{
    element_list, element_text, CustomSection, Education, Experience, ProfileDocument, Skill,
};

use super::html::{element, escape_html, safe_href, text_element};

/// Section headings and fixed copy. Themes vary the voice, not the structure.
#[derive(Debug, Clone, Copy)]
pub struct Labels {
    pub experience: &'static str,
    pub education: &'static str,
    pub projects: &'static str,
    pub skills: &'static str,
    pub links: &'static str,
    pub link_text: &'static str,
    pub footer: &'static str,
}

pub const STANDARD_LABELS: Labels = Labels {
    experience: "Work Experience",
    education: "Education",
    projects: "Projects & Activities",
    skills: "Skills",
    links: "Links",
    link_text: "View Project",
    footer: "Built with Folio",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillDisplay {
    /// Bare names as tags.
    Tags,
    /// Name plus a four-step meter driven by the level.
    Meter,
    /// Name with level and years as small print.
    Levels,
}

fn section(class: &str, heading: &str, body: &str) -> String {
    if body.is_empty() {
        return String::new();
    }
    format!(
        "<section class=\"section {class}\"><h2>{}</h2>{body}</section>",
        escape_html(heading)
    )
}

pub fn header(profile: &ProfileDocument) -> String {
    let name = profile.full_name();
    let mut inner = String::new();
    inner.push_str(&text_element("h1", "name", Some(&name)));
    inner.push_str(&text_element("p", "summary", profile.summary.as_deref()));
    inner.push_str(&contact(profile));
    element("header", "profile-header", &inner)
}

pub fn contact(profile: &ProfileDocument) -> String {
    let Some(contact) = &profile.contact else {
        return String::new();
    };

    let mut items = String::new();
    if let Some(email) = contact.email.as_deref() {
        items.push_str(&format!(
            "<li class=\"email\"><a href=\"mailto:{0}\">{0}</a></li>",
            escape_html(email)
        ));
    }
    if let Some(phone) = contact.phone.as_deref() {
        items.push_str(&text_element("li", "phone", Some(phone)));
    }
    if let Some(address) = &contact.address {
        let city_line = [address.city.as_deref(), address.state.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(", ");
        let parts: Vec<&str> = [
            address.line1.as_deref(),
            address.line2.as_deref(),
            Some(city_line.as_str()),
            address.zip.as_deref(),
        ]
        .into_iter()
        .flatten()
        .filter(|part| !part.trim().is_empty())
        .collect();
        if !parts.is_empty() {
            items.push_str(&text_element("li", "address", Some(&parts.join(" "))));
        }
    }
    element("ul", "contact", &items)
}

pub fn links(profile: &ProfileDocument, labels: &Labels) -> String {
    let items: String = profile
        .links
        .iter()
        .filter_map(|link| {
            let url = link.url.as_deref()?;
            let name = link.name.as_deref().unwrap_or(url);
            Some(format!(
                "<li><a href=\"{}\" rel=\"noopener\">{}</a></li>",
                safe_href(url),
                escape_html(name)
            ))
        })
        .collect();
    section("links", labels.links, &element("ul", "link-list", &items))
}

fn experience_entry(entry: &Experience, labels: &Labels) -> String {
    let mut head = String::new();
    head.push_str(&text_element("h3", "", entry.title()));
    head.push_str(&text_element("span", "org", entry.organization()));

    let mut meta = String::new();
    let dates = entry.date.as_ref().and_then(|d| d.display());
    meta.push_str(&text_element("span", "date", dates.as_deref()));
    meta.push_str(&text_element("span", "location", entry.location.as_deref()));
    meta.push_str(&text_element("span", "kind", entry.kind.as_deref()));

    let bullets: String = entry
        .bullets
        .iter()
        .map(|b| text_element("li", "", Some(b)))
        .collect();

    let mut inner = String::new();
    inner.push_str(&element("div", "entry-head", &head));
    inner.push_str(&element("div", "entry-meta", &meta));
    inner.push_str(&text_element("p", "description", entry.description.as_deref()));
    inner.push_str(&element("ul", "bullets", &bullets));
    if let Some(link) = entry.link.as_deref() {
        inner.push_str(&format!(
            "<a class=\"entry-link\" href=\"{}\" rel=\"noopener\">{}</a>",
            safe_href(link),
            escape_html(labels.link_text)
        ));
    }
    element("article", "entry", &inner)
}

pub fn experiences(class: &str, heading: &str, entries: &[Experience], labels: &Labels) -> String {
    let body: String = entries
        .iter()
        .map(|entry| experience_entry(entry, labels))
        .collect();
    section(class, heading, &body)
}

fn education_entry(entry: &Education) -> String {
    let mut head = String::new();
    head.push_str(&text_element("h3", "", entry.degree.as_deref()));
    head.push_str(&text_element("span", "org", entry.school_name.as_deref()));

    let mut meta = String::new();
    let dates = entry.date.as_ref().and_then(|d| d.display());
    meta.push_str(&text_element("span", "date", dates.as_deref()));
    meta.push_str(&text_element("span", "location", entry.location.as_deref()));
    let gpa = entry.gpa.as_deref().map(|gpa| format!("GPA {gpa}"));
    meta.push_str(&text_element("span", "gpa", gpa.as_deref()));

    let studies = [
        ("Major", &entry.majors),
        ("Minor", &entry.minors),
        ("Awards", &entry.awards),
    ]
    .into_iter()
    .filter(|(_, values)| !values.is_empty())
    .map(|(label, values)| {
        format!(
            "<li><strong>{label}:</strong> {}</li>",
            escape_html(&values.join(", "))
        )
    })
    .collect::<String>();

    let mut inner = String::new();
    inner.push_str(&element("div", "entry-head", &head));
    inner.push_str(&element("div", "entry-meta", &meta));
    inner.push_str(&element("ul", "studies", &studies));
    inner.push_str(&text_element("p", "description", entry.education_description.as_deref()));
    element("article", "entry", &inner)
}

pub fn education(heading: &str, entries: &[Education]) -> String {
    let body: String = entries.iter().map(education_entry).collect();
    section("education", heading, &body)
}

/// Groups skills by category in order of first appearance.
fn group_skills(skills: &[Skill]) -> Vec<(&str, Vec<&Skill>)> {
    let mut groups: Vec<(&str, Vec<&Skill>)> = Vec::new();
    for skill in skills.iter().filter(|s| s.name.is_some()) {
        let category = skill.category.as_deref().unwrap_or("Other");
        match groups.iter_mut().find(|(name, _)| *name == category) {
            Some((_, members)) => members.push(skill),
            None => groups.push((category, vec![skill])),
        }
    }
    groups
}

fn skill_item(skill: &Skill, display: SkillDisplay) -> String {
    let name = escape_html(skill.name.as_deref().unwrap_or_default());
    match display {
        SkillDisplay::Tags => format!("<li class=\"skill tag\">{name}</li>"),
        SkillDisplay::Meter => {
            let rank = skill.level.map(|l| l.rank()).unwrap_or(0);
            let meter: String = (1..=4).map(|i| if i <= rank { '●' } else { '○' }).collect();
            format!(
                "<li class=\"skill\"><span class=\"skill-name\">{name}</span><span class=\"meter\" data-level=\"{rank}\">{meter}</span></li>"
            )
        }
        SkillDisplay::Levels => {
            let mut detail = Vec::new();
            if let Some(level) = skill.level {
                detail.push(level.as_str().to_string());
            }
            if let Some(years) = skill.years_experience.as_deref() {
                detail.push(format!("{years} yrs"));
            }
            let detail = if detail.is_empty() {
                String::new()
            } else {
                format!(" <small>{}</small>", escape_html(&detail.join(" · ")))
            };
            format!("<li class=\"skill\">{name}{detail}</li>")
        }
    }
}

pub fn skills(heading: &str, skills: &[Skill], display: SkillDisplay) -> String {
    let body: String = group_skills(skills)
        .into_iter()
        .map(|(category, members)| {
            let items: String = members.iter().map(|s| skill_item(s, display)).collect();
            format!(
                "<div class=\"skill-group\"><h3>{}</h3><ul>{items}</ul></div>",
                escape_html(category)
            )
        })
        .collect();
    section("skills", heading, &body)
}

fn custom_section(custom: &CustomSection) -> String {
    let heading = custom
        .name
        .as_deref()
        .or(custom.kind.as_deref())
        .unwrap_or("More");

    let body: String = custom
        .elements
        .iter()
        .map(|record| {
            let mut inner = text_element("h3", "", element_text(record, "name").as_deref());
            for key in record.keys().filter(|k| k.as_str() != "name") {
                if let Some(value) = element_text(record, key) {
                    inner.push_str(&format!(
                        "<span class=\"detail\" data-field=\"{}\">{}</span>",
                        escape_html(key),
                        escape_html(&value)
                    ));
                    continue;
                }
                let items: String = element_list(record, key)
                    .iter()
                    .map(|item| text_element("li", "", Some(item)))
                    .collect();
                inner.push_str(&element("ul", "detail-list", &items));
            }
            element("article", "entry", &inner)
        })
        .collect();

    section("custom", heading, &body)
}

pub fn custom_sections(profile: &ProfileDocument) -> String {
    profile.custom_sections.iter().map(custom_section).collect()
}

pub fn footer(profile: &ProfileDocument, labels: &Labels) -> String {
    let mut inner = text_element("p", "signature", Some(labels.footer));
    inner.push_str(&text_element("p", "owner", Some(&profile.full_name())));
    element("footer", "footer", &inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn profile(value: serde_json::Value) -> ProfileDocument {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_empty_profile_renders_no_sections() {
        let empty = ProfileDocument::default();
        assert_eq!(header(&empty), "");
        assert_eq!(links(&empty, &STANDARD_LABELS), "");
        assert_eq!(
            experiences("work", "Work", &empty.work_experiences, &STANDARD_LABELS),
            ""
        );
        assert_eq!(education("Education", &empty.education), "");
        assert_eq!(skills("Skills", &empty.skills, SkillDisplay::Tags), "");
        assert_eq!(custom_sections(&empty), "");
    }

    #[test]
    fn test_skills_grouped_by_first_seen_category() {
        let p = profile(json!({"skills": [
            {"name": "Rust", "category": "Languages", "level": "expert"},
            {"name": "Postgres", "category": "Data"},
            {"name": "Go", "category": "Languages", "level": "intermediate"},
            {"name": "Whistling"},
            {"category": "Nameless"}
        ]}));
        let html = skills("Skills", &p.skills, SkillDisplay::Meter);

        let languages = html.find("<h3>Languages</h3>").unwrap();
        let data = html.find("<h3>Data</h3>").unwrap();
        let other = html.find("<h3>Other</h3>").unwrap();
        assert!(languages < data && data < other);
        assert!(!html.contains("Nameless"));
        assert!(html.contains("data-level=\"4\">●●●●"));
        assert!(html.contains("data-level=\"2\">●●○○"));
    }

    #[test]
    fn test_experience_entry_fields_are_escaped() {
        let p = profile(json!({"extra_experiences": [{
            "name": "<Compiler>",
            "role": "Author",
            "type": "project",
            "bullets": ["fast & small"],
            "link": "javascript:alert(1)"
        }]}));
        let html = experiences("projects", "Projects", &p.extra_experiences, &STANDARD_LABELS);
        assert!(html.contains("<h3>&lt;Compiler&gt;</h3>"));
        assert!(html.contains("<span class=\"org\">Author</span>"));
        assert!(html.contains("<li>fast &amp; small</li>"));
        assert!(html.contains("href=\"#\""));
    }

    #[test]
    fn test_custom_section_renders_loose_records() {
        let p = profile(json!({"custom_sections": [{
            "type": "certifications",
            "elements": [{"name": "CKA", "year": 2023, "topics": ["k8s", "etcd"]}]
        }]}));
        let html = custom_sections(&p);
        assert!(html.contains("<h2>certifications</h2>"));
        assert!(html.contains("<h3>CKA</h3>"));
        assert!(html.contains("data-field=\"year\">2023</span>"));
        assert!(html.contains("<li>etcd</li>"));
    }

    #[test]
    fn test_contact_address_line() {
        let p = profile(json!({"contact": {
            "email": "ada@example.com",
            "address": {"city": "London", "state": "UK", "zip": "N1"}
        }}));
        let html = contact(&p);
        assert!(html.contains("mailto:ada@example.com"));
        assert!(html.contains("<li class=\"address\">London, UK N1</li>"));
    }
}
