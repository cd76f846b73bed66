//! The eleven built-in themes.
//!
//! A built-in theme is data: a layout, its section labels, how skills are
//! shown and a stylesheet. All of them render through the same section
//! toolkit, so a partial profile produces partial output under every theme.

use crate::models::profile::ProfileDocument;

use super::sections::{self, Labels, SkillDisplay, STANDARD_LABELS};
use super::{RenderError, Theme};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Header followed by every section in order.
    Stacked,
    /// Identity, links and skills in an aside; history in the main column.
    Sidebar,
    /// Work and education side by side under a masthead.
    Columns,
    /// A terminal window with a title bar and a trailing cursor.
    Console { title: &'static str },
}

#[derive(Debug)]
pub struct ThemeStyle {
    pub key: &'static str,
    pub layout: Layout,
    pub labels: Labels,
    pub skills: SkillDisplay,
    pub css: &'static str,
}

pub static BUILTIN_STYLES: [ThemeStyle; 11] = [
    ThemeStyle {
        key: "minimal",
        layout: Layout::Stacked,
        labels: Labels {
            experience: "Experience",
            projects: "Projects",
            link_text: "View →",
            footer: "",
            ..STANDARD_LABELS
        },
        skills: SkillDisplay::Tags,
        css: ".theme-minimal{font-family:system-ui,sans-serif;max-width:720px;margin:0 auto;padding:48px 24px;color:#222;line-height:1.6}\
.theme-minimal h2{font-size:.8rem;letter-spacing:.12em;text-transform:uppercase;color:#888}\
.theme-minimal a{color:var(--accent,#6366f1)}\
.theme-minimal .tag{display:inline-block;margin:0 8px 8px 0;padding:2px 10px;border:1px solid #ddd;border-radius:999px}",
    },
    ThemeStyle {
        key: "professional",
        layout: Layout::Sidebar,
        labels: STANDARD_LABELS,
        skills: SkillDisplay::Levels,
        css: ".theme-professional{font-family:Georgia,serif;color:#1f2937;background:#f9fafb}\
.theme-professional .layout{display:grid;grid-template-columns:280px 1fr;gap:32px;max-width:1100px;margin:0 auto;padding:40px}\
.theme-professional aside{border-right:3px solid var(--accent,#1e3a8a);padding-right:24px}\
.theme-professional h2{color:var(--accent,#1e3a8a);border-bottom:1px solid #e5e7eb}",
    },
    ThemeStyle {
        key: "magazine",
        layout: Layout::Columns,
        labels: Labels {
            experience: "The Work",
            education: "The Schooling",
            projects: "Features",
            skills: "Toolkit",
            ..STANDARD_LABELS
        },
        skills: SkillDisplay::Tags,
        css: ".theme-magazine{font-family:'Playfair Display',Georgia,serif;max-width:1200px;margin:0 auto;padding:32px}\
.theme-magazine .name{font-size:4rem;text-transform:uppercase;border-bottom:8px solid var(--accent,#111)}\
.theme-magazine .columns{display:grid;grid-template-columns:1fr 1fr;gap:48px}\
.theme-magazine .summary::first-letter{font-size:3rem;float:left;line-height:1}",
    },
    ThemeStyle {
        key: "retro",
        layout: Layout::Sidebar,
        labels: Labels {
            links: "Navigation",
            ..STANDARD_LABELS
        },
        skills: SkillDisplay::Levels,
        css: ".theme-retro{font-family:'Comic Sans MS','Times New Roman',serif;background:#c0c0c0;color:#000}\
.theme-retro .layout{display:grid;grid-template-columns:220px 1fr;gap:12px;padding:12px}\
.theme-retro .section{background:#fff;border:2px outset #fff;padding:8px}\
.theme-retro h2{background:var(--accent,#000080);color:#fff;padding:2px 6px}",
    },
    ThemeStyle {
        key: "terminal",
        layout: Layout::Console {
            title: "terminal — portfolio",
        },
        labels: Labels {
            experience: "$ cat experience.log",
            education: "$ cat education.log",
            projects: "$ ls projects/",
            skills: "$ which --all skills",
            links: "$ cat links.txt",
            link_text: "open",
            footer: "$ exit",
        },
        skills: SkillDisplay::Tags,
        css: ".theme-terminal{background:#1e1e1e;color:#d4d4d4;font-family:'Fira Code',monospace;padding:24px}\
.theme-terminal .console-bar{background:#333;padding:6px 12px;border-radius:6px 6px 0 0}\
.theme-terminal h2{color:var(--accent,#4ec9b0);font-size:1rem}\
.theme-terminal .cursor{animation:blink 1s step-end infinite}@keyframes blink{50%{opacity:0}}",
    },
    ThemeStyle {
        key: "hacker",
        layout: Layout::Console {
            title: "root@portfolio:~$",
        },
        labels: Labels {
            experience: "> ./list --work",
            education: "> ./list --education",
            projects: "> ./list --projects",
            skills: "> ./scan --skills",
            links: "> ./netstat",
            link_text: "[connect]",
            footer: "[OK] Loading profile data... done",
        },
        skills: SkillDisplay::Meter,
        css: ".theme-hacker{background:#000;color:#00ff41;font-family:'Courier New',monospace;padding:24px;text-shadow:0 0 4px #00ff41}\
.theme-hacker h2{color:var(--accent,#00ff41)}\
.theme-hacker a{color:#0f0}\
.theme-hacker .meter{letter-spacing:2px;margin-left:8px}",
    },
    ThemeStyle {
        key: "nature",
        layout: Layout::Stacked,
        labels: Labels {
            experience: "Growth Rings",
            education: "Roots",
            projects: "Branches",
            skills: "Seeds",
            footer: "Rooted in curiosity",
            ..STANDARD_LABELS
        },
        skills: SkillDisplay::Levels,
        css: ".theme-nature{background:linear-gradient(#f0fdf4,#dcfce7);color:#14532d;font-family:'Nunito',sans-serif;padding:48px}\
.theme-nature .section{background:#fff;border-radius:24px;padding:24px;margin:24px 0}\
.theme-nature h2{color:var(--accent,#15803d)}",
    },
    ThemeStyle {
        key: "adventurous",
        layout: Layout::Stacked,
        labels: Labels {
            experience: "Expeditions",
            education: "Training Grounds",
            projects: "Treasures Found",
            skills: "Gear",
            links: "Charts",
            footer: "End of Dive",
            ..STANDARD_LABELS
        },
        skills: SkillDisplay::Meter,
        css: ".theme-adventurous{background:linear-gradient(#0c4a6e,#082f49);color:#e0f2fe;font-family:'Trebuchet MS',sans-serif;padding:48px}\
.theme-adventurous h2{color:var(--accent,#fbbf24)}\
.theme-adventurous .entry{border-left:4px solid var(--accent,#fbbf24);padding-left:16px}",
    },
    ThemeStyle {
        key: "book",
        layout: Layout::Stacked,
        labels: Labels {
            experience: "Chapter I: Experience",
            education: "Chapter II: Education",
            projects: "Chapter III: Projects",
            skills: "Appendix: Skills",
            links: "Bibliography",
            footer: "The End",
            ..STANDARD_LABELS
        },
        skills: SkillDisplay::Levels,
        css: ".theme-book{background:#fdf6e3;color:#3b2f2f;font-family:Garamond,serif;max-width:760px;margin:0 auto;padding:64px;box-shadow:0 0 24px rgba(0,0,0,.15)}\
.theme-book h2{text-align:center;font-variant:small-caps;color:var(--accent,#7c2d12)}\
.theme-book .description{text-indent:2em}",
    },
    ThemeStyle {
        key: "ancient",
        layout: Layout::Sidebar,
        labels: Labels {
            experience: "Deeds",
            education: "Teachings",
            projects: "Artifacts",
            skills: "Arts Mastered",
            links: "Scrolls",
            link_text: "Unseal",
            footer: "Thus ends the chronicle",
        },
        skills: SkillDisplay::Meter,
        css: ".theme-ancient{background:#f4e4bc;color:#3e2723;font-family:'Cinzel',serif}\
.theme-ancient .layout{display:grid;grid-template-columns:260px 1fr;gap:32px;padding:48px}\
.theme-ancient h2{text-transform:uppercase;letter-spacing:.2em;color:var(--accent,#8d6e63)}\
.theme-ancient .section{border:2px double #8d6e63;padding:16px}",
    },
    ThemeStyle {
        key: "cyberpunk",
        layout: Layout::Columns,
        labels: Labels {
            projects: "Projects/Extra Experiences",
            link_text: "View",
            footer: "// signal lost",
            ..STANDARD_LABELS
        },
        skills: SkillDisplay::Meter,
        css: ".theme-cyberpunk{background:#0d0221;color:#f0f0f0;font-family:'Orbitron',sans-serif;padding:32px}\
.theme-cyberpunk .name{color:var(--accent,#ff2a6d);text-shadow:0 0 12px var(--accent,#ff2a6d)}\
.theme-cyberpunk .columns{display:grid;grid-template-columns:1fr 1fr;gap:24px}\
.theme-cyberpunk .section{border:1px solid #05d9e8;box-shadow:0 0 8px #05d9e8;padding:16px}",
    },
];

/// A stateless theme backed by a [`ThemeStyle`].
#[derive(Debug, Clone, Copy)]
pub struct BuiltinTheme {
    style: &'static ThemeStyle,
}

impl BuiltinTheme {
    pub fn all() -> Vec<BuiltinTheme> {
        BUILTIN_STYLES
            .iter()
            .map(|style| BuiltinTheme { style })
            .collect()
    }
}

impl Theme for BuiltinTheme {
    fn key(&self) -> &str {
        self.style.key
    }

    fn render(&self, profile: &ProfileDocument) -> Result<String, RenderError> {
        Ok(render_with(self.style, profile))
    }
}

pub fn render_with(style: &ThemeStyle, profile: &ProfileDocument) -> String {
    let labels = &style.labels;
    let header = sections::header(profile);
    let links = sections::links(profile, labels);
    let work = sections::experiences("work", labels.experience, &profile.work_experiences, labels);
    let education = sections::education(labels.education, &profile.education);
    let projects = sections::experiences(
        "projects",
        labels.projects,
        &profile.extra_experiences,
        labels,
    );
    let skills = sections::skills(labels.skills, &profile.skills, style.skills);
    let custom = sections::custom_sections(profile);
    let footer = sections::footer(profile, labels);

    let body = match style.layout {
        Layout::Stacked => {
            [header, links, work, education, projects, skills, custom, footer].concat()
        }
        Layout::Sidebar => format!(
            "<div class=\"layout\"><aside>{header}{links}{skills}</aside><main>{work}{education}{projects}{custom}</main></div>{footer}"
        ),
        Layout::Columns => format!(
            "{header}<div class=\"columns\">{work}{education}</div>{projects}{skills}{links}{custom}{footer}"
        ),
        Layout::Console { title } => format!(
            "<div class=\"console-bar\">{title}</div><div class=\"console\">{header}{work}{education}{projects}{skills}{links}{custom}{footer}<span class=\"cursor\">▌</span></div>",
            title = super::html::escape_html(title)
        ),
    };

    format!(
        "<div class=\"theme theme-{key}\"><style>{css}</style>{body}</div>",
        key = style.key,
        css = style.css
    )
}
