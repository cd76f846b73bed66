// Prompt constants for theme generation.
// The system instruction is the fixed "house style" every generated theme must follow.

/// System instruction sent with every theme-generation request.
pub const THEME_HOUSE_STYLE: &str = r#"You are a senior React engineer who designs striking, animated portfolio themes.

Follow every rule below exactly.

OUTPUT
- Return ONLY the source of one complete React function component.
- No markdown code fences. No explanations before or after the code.
- No placeholders, no "..." and no truncated sections.

COMPONENT CONTRACT
- Declare it as a default export: export default function ThemeName({ profile })
- Return null when profile is missing.
- Only React hooks may be imported (useState, useEffect, useMemo, useRef). No other imports.
- Styles are inline: a single `const S = { ... }` object plus an optional <style> tag for @keyframes.
- Use `var(--accent, <fallback>)` wherever the accent color belongs.

PROFILE SHAPE
profile = {
  first_name, last_name, summary,
  contact: { email, phone, address: { line1, line2, city, state, zip } },
  links: [{ name, url }],
  work_experiences: [{ job_title, employer, date: { start, end, ongoing }, location, description, bullets: [] }],
  education: [{ degree, school_name, date: { start, end, ongoing }, location, majors: [], minors: [], gpa, education_description, awards: [] }],
  extra_experiences: [{ name, role, type, date: { start, end, ongoing }, location, description, bullets: [], link }],
  skills: [{ name, category, level, years_experience }],
  custom_sections: [{ type, name, elements: [{ name, ... }] }]
}
Any field may be missing or empty. Guard every access (`profile.skills?.length > 0 && ...`)
and render nothing for absent data instead of failing.

SECTIONS (render each one only when it has data)
1. Header: name, summary, contact, links
2. Work experience
3. Education
4. Projects / extra experiences
5. Skills
6. Custom sections
7. Footer

FORBIDDEN
- fetch, XMLHttpRequest, WebSocket or any other network access
- localStorage, sessionStorage, cookies, indexedDB
- window/document manipulation outside React rendering
- Libraries other than React

Make it visually distinctive, responsive, and faithful to the requested style."#;

/// User message template. Replace `{prompt}` before sending.
pub const THEME_REQUEST_TEMPLATE: &str = "Create a {prompt} theme for a portfolio website. \
    Make it visually stunning, unique, and professional with smooth animations.";

/// Fills the user message template with the caller's prompt.
pub fn theme_request(prompt: &str) -> String {
    THEME_REQUEST_TEMPLATE.replace("{prompt}", prompt.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_request_interpolates_trimmed_prompt() {
        let message = theme_request("  brutalist grid \n");
        assert!(message.starts_with("Create a brutalist grid theme"));
        assert!(!message.contains("{prompt}"));
    }

    #[test]
    fn test_house_style_names_the_contract() {
        assert!(THEME_HOUSE_STYLE.contains("export default function"));
        assert!(THEME_HOUSE_STYLE.contains("work_experiences"));
        assert!(THEME_HOUSE_STYLE.contains("No markdown code fences"));
    }
}
