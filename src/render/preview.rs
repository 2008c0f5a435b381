//! Visual tree rendering for résumé documents.

use crate::icons;
use crate::model::{
    Certification, Document, Education, Experience, Language, PersonalInfo, Project, Section,
    Skill, SkillCategory, Theme,
};
use crate::view::{Element, VisualTree};

use super::RenderOptions;

/// Attribute marking the data entry a node was rendered from.
pub const ENTRY_ATTR: &str = "data-entry";
/// Attribute marking a rendered section.
pub const SECTION_ATTR: &str = "data-section";
/// Attribute carrying an icon slug.
pub const ICON_ATTR: &str = "data-icon";
/// Class of the embedded export controls container.
pub const EXPORT_CONTROLS_CLASS: &str = "export-controls";

/// Render a document into a visual tree.
pub fn render(doc: &Document, options: &RenderOptions) -> VisualTree {
    PreviewRenderer::new(options.clone()).render(doc)
}

/// Builds the résumé visual tree.
///
/// The root carries the configured element id and a two-column grid: a
/// sidebar (profile, contact, skills, languages, certifications) and a
/// main column (summary, experience, projects, education). Theme colors
/// are written as inline styles so that the tree is self-contained.
pub struct PreviewRenderer {
    options: RenderOptions,
}

impl PreviewRenderer {
    /// Create a new renderer.
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Render a document.
    pub fn render(&self, doc: &Document) -> VisualTree {
        let theme = &doc.theme;
        let grid = Element::new("div")
            .class("grid grid-cols-1 lg:grid-cols-3 gap-0")
            .child(self.sidebar(doc))
            .child(self.main_column(doc));

        let root = Element::new("div")
            .id(self.options.root_id.clone())
            .class(self.options.presentation.root_classes())
            .style("color", theme.colors.text.clone())
            .child_opt(self.options.export_controls.then(export_controls))
            .child(grid);

        VisualTree::from_element(root)
    }

    fn sidebar(&self, doc: &Document) -> Element {
        let theme = &doc.theme;
        let sections = &doc.sections;
        let mut sidebar = Element::new("div")
            .class("text-white p-8 lg:col-span-1")
            .style(
                "background",
                format!(
                    "linear-gradient(to bottom, {}, {})",
                    theme.colors.primary, theme.colors.secondary
                ),
            );

        if sections.is_visible(Section::PersonalInfo) {
            sidebar = sidebar
                .child(profile(&doc.personal_info, theme))
                .child(contact(&doc.personal_info));
        }
        if sections.is_visible(Section::Skills) {
            sidebar = sidebar.child(skills(&doc.skills));
        }
        if sections.is_visible(Section::Languages) {
            sidebar = sidebar.child(languages(&doc.languages));
        }
        if sections.is_visible(Section::Certifications) {
            sidebar = sidebar.child(certifications(&doc.certifications));
        }
        sidebar
    }

    fn main_column(&self, doc: &Document) -> Element {
        let theme = &doc.theme;
        let sections = &doc.sections;
        let mut main = Element::new("div").class("lg:col-span-2 p-8");

        if sections.is_visible(Section::PersonalInfo) && !doc.personal_info.summary.is_empty() {
            main = main.child(
                section("summary", "Career Profile", theme).child(
                    Element::new("p")
                        .class("leading-relaxed")
                        .style("color", theme.colors.muted.clone())
                        .text(doc.personal_info.summary.clone()),
                ),
            );
        }
        if sections.is_visible(Section::Experience) {
            main = main.child(
                section("experience", "Professional Experience", theme)
                    .children(doc.experiences.iter().map(|e| experience(e, theme))),
            );
        }
        if sections.is_visible(Section::Projects) {
            main = main.child(
                section("projects", "Recent Personal Projects", theme).child(
                    Element::new("div")
                        .class("grid grid-cols-1 md:grid-cols-2 gap-6")
                        .children(doc.projects.iter().map(|p| project(p, theme))),
                ),
            );
        }
        if sections.is_visible(Section::Education) {
            main = main.child(
                section("education", "Education", theme)
                    .children(doc.education.iter().map(|e| education(e, theme))),
            );
        }
        main
    }
}

fn export_controls() -> Element {
    let button = |label: &str, action: &str| {
        Element::new("button")
            .class("px-3 py-2 bg-blue-600 text-white text-xs font-medium rounded-md")
            .attr("data-action", action)
            .text(label)
    };
    Element::new("div")
        .class("export-controls flex flex-wrap gap-2 p-6")
        .child(button("Export PDF (A4)", "pdf-a4"))
        .child(button("Export PDF (Letter)", "pdf-letter"))
        .child(button("Export PNG", "image-png"))
        .child(button("Export JPEG", "image-jpeg"))
        .child(button("Direct PDF", "direct-pdf"))
}

fn icon(slug: &str, classes: &str) -> Element {
    Element::new("i").class(classes).attr(ICON_ATTR, slug)
}

fn sidebar_heading(text: &str) -> Element {
    Element::new("h2")
        .class("text-xl font-semibold mb-4 text-blue-200")
        .text(text)
}

fn profile(info: &PersonalInfo, theme: &Theme) -> Element {
    let avatar = match &info.profile_image {
        Some(src) => Element::new("img")
            .class("w-full h-full object-cover")
            .attr("src", src.clone())
            .attr("alt", info.full_name.clone())
            .attr("width", "128")
            .attr("height", "128"),
        None => icon("user", "text-6xl").style("color", theme.colors.primary.clone()),
    };

    Element::new("div")
        .class("text-center mb-8")
        .attr(SECTION_ATTR, "profile")
        .child(
            Element::new("div")
                .class("w-32 h-32 bg-white rounded-full mx-auto mb-4 flex items-center justify-center overflow-hidden")
                .child(avatar),
        )
        .child(
            Element::new("h1")
                .class("text-3xl font-bold mb-2")
                .text(info.full_name.clone()),
        )
        .child(
            Element::new("p")
                .class("text-blue-200 text-lg")
                .text(info.title.clone()),
        )
}

fn contact(info: &PersonalInfo) -> Element {
    let row = |slug: &str, text: &str, href: Option<String>| {
        let label = match href {
            Some(href) => Element::new("a").class("text-sm").attr("href", href),
            None => Element::new("span").class("text-sm"),
        };
        Element::new("div")
            .class("flex items-center")
            .child(icon(slug, "w-5 h-5 text-blue-300 mr-3"))
            .child(label.text(text))
    };

    let mut rows = vec![row("mail", &info.email, Some(format!("mailto:{}", info.email)))];
    if !info.phone.is_empty() {
        rows.push(row("phone", &info.phone, Some(format!("tel:{}", info.phone))));
    }
    rows.push(row("map-pin", &info.location, None));
    if !info.linkedin.is_empty() {
        rows.push(row(
            "linkedin",
            &info.linkedin,
            Some(format!("https://linkedin.com/in/{}", info.linkedin)),
        ));
    }
    if !info.github.is_empty() {
        rows.push(row(
            "github",
            &info.github,
            Some(format!("https://github.com/{}", info.github)),
        ));
    }
    if let Some(website) = info.website.as_deref().filter(|w| !w.is_empty()) {
        rows.push(row("globe", website, Some(website.to_string())));
    }

    Element::new("div")
        .class("mb-8")
        .attr(SECTION_ATTR, "contact")
        .child(sidebar_heading("Contact"))
        .child(Element::new("div").class("space-y-3").children(rows))
}

/// Group skills by category in first-seen order, leaving out soft skills.
pub fn group_skills(skills: &[Skill]) -> Vec<(SkillCategory, Vec<&Skill>)> {
    let mut groups: Vec<(SkillCategory, Vec<&Skill>)> = Vec::new();
    for skill in skills.iter().filter(|s| s.category != SkillCategory::Soft) {
        match groups.iter_mut().find(|(c, _)| *c == skill.category) {
            Some((_, members)) => members.push(skill),
            None => groups.push((skill.category, vec![skill])),
        }
    }
    groups
}

fn skills(skills: &[Skill]) -> Element {
    let groups = group_skills(skills).into_iter().map(|(category, members)| {
        Element::new("div")
            .attr("data-category", category.label())
            .child(
                Element::new("h3")
                    .class("font-medium text-blue-200 mb-2")
                    .text(category.label()),
            )
            .child(
                Element::new("div")
                    .class("flex flex-wrap gap-2")
                    .children(members.into_iter().map(|skill| {
                        let slug = skill
                            .icon
                            .as_deref()
                            .unwrap_or_else(|| icons::icon_for(&skill.name));
                        Element::new("span")
                            .class("bg-blue-700 px-2 py-1 rounded text-xs flex items-center")
                            .attr(ENTRY_ATTR, "skill")
                            .attr("data-id", skill.id.clone())
                            .child(icon(slug, "w-3 h-3 mr-1 text-white"))
                            .child(Element::new("span").text(skill.name.clone()))
                    })),
            )
    });

    Element::new("div")
        .class("mb-8")
        .attr(SECTION_ATTR, "skills")
        .child(sidebar_heading("Technical Skills"))
        .child(Element::new("div").class("space-y-4").children(groups))
}

fn languages(languages: &[Language]) -> Element {
    Element::new("div")
        .class("mb-8")
        .attr(SECTION_ATTR, "languages")
        .child(sidebar_heading("Languages"))
        .child(
            Element::new("div")
                .class("space-y-2")
                .children(languages.iter().map(|language| {
                    Element::new("div")
                        .class("flex justify-between")
                        .attr(ENTRY_ATTR, "language")
                        .attr("data-id", language.id.clone())
                        .child(Element::new("span").text(language.name.clone()))
                        .child(
                            Element::new("span")
                                .class("text-blue-200")
                                .text(language.proficiency.to_string()),
                        )
                })),
        )
}

fn certifications(certifications: &[Certification]) -> Element {
    Element::new("div")
        .attr(SECTION_ATTR, "certifications")
        .child(sidebar_heading("Certifications"))
        .child(
            Element::new("div")
                .class("space-y-2")
                .children(certifications.iter().map(|cert| {
                    Element::new("div")
                        .class("flex items-start")
                        .attr(ENTRY_ATTR, "certification")
                        .attr("data-id", cert.id.clone())
                        .child(icon("award", "w-4 h-4 text-yellow-400 mr-2 mt-1 flex-shrink-0"))
                        .child(
                            Element::new("div")
                                .child(
                                    Element::new("span")
                                        .class("text-sm font-medium")
                                        .text(cert.name.clone()),
                                )
                                .child(
                                    Element::new("p")
                                        .class("text-xs text-blue-200")
                                        .text(cert.issuer.clone()),
                                )
                                .child(
                                    Element::new("p")
                                        .class("text-xs text-blue-300")
                                        .text(cert.date.clone()),
                                ),
                        )
                })),
        )
}

fn section(name: &str, title: &str, theme: &Theme) -> Element {
    Element::new("section")
        .class("mb-8")
        .attr(SECTION_ATTR, name)
        .child(
            Element::new("h2")
                .class("text-2xl font-bold mb-4 pb-2 border-b-2")
                .style("color", theme.colors.text.clone())
                .style("border-color", theme.colors.primary.clone())
                .text(title),
        )
}

fn tech_tags(technologies: &[String], theme: &Theme) -> Element {
    Element::new("div")
        .class("flex flex-wrap gap-2")
        .children(technologies.iter().map(|tech| {
            Element::new("span")
                .class("px-2 py-1 rounded text-xs font-medium flex items-center")
                .style("background-color", format!("{}20", theme.colors.accent))
                .style("color", theme.colors.primary.clone())
                .child(icon(icons::icon_for(tech), "w-3 h-3 mr-1"))
                .child(Element::new("span").text(tech.clone()))
        }))
}

fn bullet(size: &str, theme: &Theme) -> Element {
    Element::new("div")
        .class(&format!("w-{0} h-{0} rounded-full mt-2 mr-3 flex-shrink-0", size))
        .style("background-color", theme.colors.primary.clone())
}

fn experience(exp: &Experience, theme: &Theme) -> Element {
    let logo = match &exp.company_logo {
        Some(src) => Element::new("div")
            .class("w-12 h-12 bg-white rounded-lg border border-gray-200 flex items-center justify-center overflow-hidden shadow-sm")
            .child(
                Element::new("img")
                    .class("w-full h-full object-contain")
                    .attr("src", src.clone())
                    .attr("alt", format!("{} logo", exp.company))
                    .attr("width", "48")
                    .attr("height", "48"),
            ),
        None => Element::new("div")
            .class("w-12 h-12 bg-white rounded-lg border border-gray-200 flex items-center justify-center shadow-sm")
            .child(icon("building", "w-6 h-6").style("color", theme.colors.primary.clone())),
    };

    let info = Element::new("div")
        .class("flex-grow")
        .child(
            Element::new("h3")
                .class("text-xl font-bold")
                .style("color", theme.colors.text.clone())
                .text(exp.position.clone()),
        )
        .child(
            Element::new("p")
                .class("text-lg font-semibold")
                .style("color", theme.colors.primary.clone())
                .text(exp.company.clone()),
        )
        .child_opt((!exp.description.is_empty()).then(|| {
            Element::new("p")
                .class("text-sm mt-1")
                .style("color", theme.colors.muted.clone())
                .text(exp.description.clone())
        }));

    let dates = Element::new("div")
        .class("text-sm text-right ml-4 flex-shrink-0")
        .style("color", theme.colors.muted.clone())
        .child(
            Element::new("p")
                .class("font-semibold")
                .style("color", theme.colors.primary.clone())
                .text(format!("{} - {}", exp.start_date, exp.display_end_date())),
        )
        .child(Element::new("p").class("text-sm").text(exp.location.clone()));

    let header = Element::new("div")
        .class("flex items-start justify-between mb-4")
        .child(
            Element::new("div")
                .class("flex items-start space-x-4")
                .child(Element::new("div").class("flex-shrink-0").child(logo))
                .child(info),
        )
        .child(dates);

    let achievements = Element::new("ul")
        .class("space-y-2")
        .style("color", theme.colors.muted.clone())
        .children(exp.achievements.iter().map(|achievement| {
            Element::new("li")
                .class("flex items-start")
                .child(bullet("2", theme))
                .child(Element::new("span").text(achievement.clone()))
        }));

    Element::new("div")
        .class("mb-6 bg-gray-50 p-6 rounded-lg border-l-4")
        .style("border-left-color", theme.colors.primary.clone())
        .attr(ENTRY_ATTR, "experience")
        .attr("data-id", exp.id.clone())
        .child(header)
        .child(achievements)
        .child_opt(
            (!exp.technologies.is_empty())
                .then(|| Element::new("div").class("mt-3").child(tech_tags(&exp.technologies, theme))),
        )
}

fn project(project: &Project, theme: &Theme) -> Element {
    let title = match &project.url {
        Some(url) => Element::new("a").attr("href", url.clone()),
        None => Element::new("h3"),
    }
    .class("text-lg font-bold")
    .style("color", theme.colors.text.clone())
    .text(project.name.clone());

    let highlights = (!project.highlights.is_empty()).then(|| {
        Element::new("ul")
            .class("space-y-1 mb-4")
            .children(project.highlights.iter().map(|highlight| {
                Element::new("li")
                    .class("text-xs flex items-start")
                    .style("color", theme.colors.muted.clone())
                    .child(bullet("1", theme))
                    .child(Element::new("span").text(highlight.clone()))
            }))
    });

    let link = |href: &str, slug: &str, label: &str, bg: &str| {
        Element::new("a")
            .class(&format!(
                "inline-flex items-center px-3 py-2 {} text-white text-xs font-medium rounded-md",
                bg
            ))
            .attr("href", href)
            .child(icon(slug, "w-4 h-4 mr-1"))
            .child(Element::new("span").text(label))
    };

    Element::new("div")
        .class("bg-gradient-to-br from-blue-50 to-blue-100 p-6 rounded-lg border border-blue-200 flex flex-col")
        .attr(ENTRY_ATTR, "project")
        .attr("data-id", project.id.clone())
        .child(
            Element::new("div")
                .class("flex items-center mb-3")
                .child(
                    icon("code", "w-6 h-6 mr-3 flex-shrink-0")
                        .style("color", theme.colors.primary.clone()),
                )
                .child(title),
        )
        .child(
            Element::new("div")
                .class("mb-3")
                .child(tech_tags(&project.technologies, theme)),
        )
        .child(
            Element::new("p")
                .class("text-sm leading-relaxed mb-3 flex-grow")
                .style("color", theme.colors.muted.clone())
                .text(project.description.clone()),
        )
        .child_opt(highlights)
        .child(
            Element::new("div")
                .class("flex flex-wrap gap-2 mt-auto pt-2")
                .child_opt(
                    project
                        .url
                        .as_deref()
                        .map(|url| link(url, "external-link", "Live Demo", "bg-blue-600")),
                )
                .child_opt(
                    project
                        .github
                        .as_deref()
                        .map(|url| link(url, "github", "Code", "bg-gray-600")),
                ),
        )
}

fn education(edu: &Education, theme: &Theme) -> Element {
    let muted = |el: Element| el.style("color", theme.colors.muted.clone());
    let labelled = |label: &str, value: String| {
        Element::new("p")
            .child(Element::new("strong").text(label))
            .child(Element::new("span").text(value))
    };

    let header = Element::new("div")
        .class("flex flex-col md:flex-row md:justify-between md:items-start mb-3")
        .child(
            Element::new("div")
                .child(
                    Element::new("h3")
                        .class("text-xl font-bold")
                        .style("color", theme.colors.text.clone())
                        .text(edu.degree.clone()),
                )
                .child(
                    Element::new("p")
                        .class("text-lg font-semibold")
                        .style("color", theme.colors.primary.clone())
                        .text(edu.institution.clone()),
                ),
        )
        .child(muted(
            Element::new("div")
                .class("text-sm mt-1 md:mt-0 md:text-right")
                .child(
                    Element::new("p")
                        .class("font-semibold")
                        .style("color", theme.colors.primary.clone())
                        .text(format!("{} - {}", edu.start_date, edu.end_date)),
                )
                .child(Element::new("p").text(edu.location.clone())),
        ));

    let coursework = edu
        .coursework
        .as_ref()
        .filter(|c| !c.is_empty())
        .map(|c| muted(labelled("Focus:", c.join(", "))));

    Element::new("div")
        .class("bg-gray-50 p-6 rounded-lg border-l-4")
        .style("border-left-color", theme.colors.primary.clone())
        .attr(ENTRY_ATTR, "education")
        .attr("data-id", edu.id.clone())
        .child(header)
        .child_opt(
            edu.gpa
                .clone()
                .map(|gpa| muted(labelled("GPA:", gpa).class("mb-2"))),
        )
        .child_opt(
            edu.description
                .clone()
                .map(|d| muted(Element::new("p").class("mb-2").text(d))),
        )
        .child_opt(coursework)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Edit, SectionsPatch};
    use crate::view::Selector;

    fn count_entries(tree: &VisualTree, kind: &str) -> usize {
        tree.subtree(tree.root())
            .into_iter()
            .filter(|id| tree.node(*id).attr(ENTRY_ATTR) == Some(kind))
            .count()
    }

    #[test]
    fn test_root_id_and_grid() {
        let tree = render(&Document::new(), &RenderOptions::default());
        let root = tree.root();
        assert_eq!(tree.node(root).element_id.as_deref(), Some("cv-preview"));
        assert_eq!(tree.select(root, &Selector::class("lg:col-span-1")).len(), 1);
        assert_eq!(tree.select(root, &Selector::class("lg:col-span-2")).len(), 1);
        assert!(tree.select(root, &Selector::class(EXPORT_CONTROLS_CLASS)).is_empty());
    }

    #[test]
    fn test_export_controls_inside_root() {
        let tree = render(
            &Document::new(),
            &RenderOptions::new().with_export_controls(true),
        );
        let controls = tree.select(tree.root(), &Selector::class(EXPORT_CONTROLS_CLASS));
        assert_eq!(controls.len(), 1);
        assert_eq!(tree.select(tree.root(), &Selector::tag("button")).len(), 5);
    }

    #[test]
    fn test_experience_visibility() {
        let doc = crate::model::apply(
            &Document::new(),
            Edit::AddExperience(Experience::new("e1", "Engineer", "Acme")),
        );
        let hidden = crate::model::apply(
            &doc,
            Edit::UpdateSections(SectionsPatch::single(Section::Experience, false)),
        );
        assert_eq!(count_entries(&render(&hidden, &RenderOptions::default()), "experience"), 0);

        let shown = crate::model::apply(
            &hidden,
            Edit::UpdateSections(SectionsPatch::single(Section::Experience, true)),
        );
        assert_eq!(count_entries(&render(&shown, &RenderOptions::default()), "experience"), 1);
    }

    #[test]
    fn test_current_job_shows_present() {
        let mut exp = Experience::new("e1", "Engineer", "Acme");
        exp.start_date = "2021".into();
        exp.is_current_job = true;
        let doc = crate::model::apply(&Document::new(), Edit::AddExperience(exp));
        let tree = render(&doc, &RenderOptions::default());
        assert!(tree.text_content(tree.root()).contains("2021 - Present"));
    }

    #[test]
    fn test_group_skills_first_seen_without_soft() {
        let skills = vec![
            Skill::new("1", "React", SkillCategory::Frontend),
            Skill::new("2", "Rust", SkillCategory::Language),
            Skill::new("3", "Teamwork", SkillCategory::Soft),
            Skill::new("4", "Vue", SkillCategory::Frontend),
        ];
        let groups = group_skills(&skills);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, SkillCategory::Frontend);
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[1].0, SkillCategory::Language);
    }

    #[test]
    fn test_theme_baked_inline() {
        let doc = Document::new();
        let tree = render(&doc, &RenderOptions::default());
        let sidebar = tree.select(tree.root(), &Selector::class("lg:col-span-1"))[0];
        let background = tree.node(sidebar).style.get("background").unwrap_or_default();
        assert!(background.contains(&doc.theme.colors.primary));
        assert!(background.contains(&doc.theme.colors.secondary));
    }

    #[test]
    fn test_skill_icons() {
        let doc = crate::model::apply(
            &Document::new(),
            Edit::AddSkill(Skill::new("s1", "Docker", SkillCategory::Devops)),
        );
        let tree = render(&doc, &RenderOptions::default());
        let icons: Vec<_> = tree
            .subtree(tree.root())
            .into_iter()
            .filter_map(|id| tree.node(id).attr(ICON_ATTR))
            .collect();
        assert!(icons.contains(&"docker"));
    }
}
