//! cvbuilder CLI - single-page résumé builder

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::watch;

use cvbuilder::export::{
    AssetLoader, DirectorySink, ExportJob, ExportOptions, ExportResult, ExportStrategy, Exporter,
    ExporterConfig, FallbackAssetLoader, FileAssetLoader, HttpAssetLoader, ImageFormat, PageSize,
    DEFAULT_ORIGIN,
};
use cvbuilder::model::{
    Certification, Edit, Education, Experience, Language, PersonalInfoPatch, Project, Section,
    SectionsPatch, Skill, Theme,
};
use cvbuilder::raster::{BoxRasterizer, FontBook, FONT_DIR_ENV};
use cvbuilder::{surface_for, FileStorage, RenderOptions, Store, ROOT_ID};

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "cvbuilder")]
#[command(author = "cvbuilder contributors")]
#[command(version)]
#[command(about = "Build a single-page résumé and export it to PDF, PNG or JPEG", long_about = None)]
struct Cli {
    /// Directory holding the saved résumé
    #[arg(long, global = true, env = "CVBUILDER_DATA_DIR", default_value = ".cvbuilder")]
    data_dir: PathBuf,

    /// Directory exported files are written to
    #[arg(long, global = true, env = "CVBUILDER_OUT_DIR", default_value = ".")]
    out_dir: PathBuf,

    /// Origin used to resolve root-relative image paths
    #[arg(long, global = true, env = "CVBUILDER_ORIGIN", default_value = DEFAULT_ORIGIN)]
    origin: String,

    /// Directory serving root-relative images
    #[arg(long, global = true, default_value = "public")]
    public_dir: PathBuf,

    /// Extra fonts for image and direct PDF exports
    #[arg(long, global = true, env = FONT_DIR_ENV)]
    font_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a fresh résumé, discarding any saved one
    Init,

    /// Show résumé summary
    Info,

    /// Replace the résumé with one read from a JSON file
    Import {
        /// JSON file produced by `export-json`
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Write the résumé as JSON
    ExportJson {
        /// Output file (<Full_Name>_CV.json in the output directory if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Print to stdout instead of writing a file
        #[arg(long)]
        stdout: bool,
    },

    /// Update personal information
    Personal {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        linkedin: Option<String>,
        #[arg(long)]
        github: Option<String>,
        #[arg(long)]
        website: Option<String>,
        /// Profile image URL or root-relative path
        #[arg(long)]
        image: Option<String>,
        #[arg(long)]
        summary: Option<String>,
    },

    /// Add an entry to a section from a JSON object
    Add {
        #[arg(value_enum)]
        section: EntrySection,

        /// Entry as JSON; a missing "id" is generated
        #[arg(value_name = "JSON")]
        json: String,
    },

    /// Merge fields from a JSON object into an existing entry
    Update {
        #[arg(value_enum)]
        section: EntrySection,

        #[arg(value_name = "ID")]
        id: String,

        /// Fields to change, as JSON
        #[arg(value_name = "JSON")]
        json: String,
    },

    /// Remove an entry by id
    #[command(alias = "rm")]
    Remove {
        #[arg(value_enum)]
        section: EntrySection,

        #[arg(value_name = "ID")]
        id: String,
    },

    /// Show or hide sections
    Sections {
        #[arg(long, value_enum, value_delimiter = ',')]
        show: Vec<SectionName>,

        #[arg(long, value_enum, value_delimiter = ',')]
        hide: Vec<SectionName>,
    },

    /// Replace the theme from a JSON object
    Theme {
        #[arg(value_name = "JSON")]
        json: String,
    },

    /// Reset every field to defaults, keeping the résumé identity
    Reset,

    /// Render the résumé as a standalone HTML page
    Preview {
        /// Use the full-screen presentation
        #[arg(long)]
        fullscreen: bool,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Export a print-ready PDF
    Pdf {
        #[arg(long, value_enum, default_value = "a4")]
        format: PageFormat,

        #[arg(long, value_enum, default_value = "print")]
        strategy: Strategy,

        /// Capture scale for the capture strategy
        #[arg(long, default_value = "2.0")]
        quality: f32,

        /// Base filename, without date or extension
        #[arg(long, default_value = "CV")]
        filename: String,
    },

    /// Capture the résumé into an 11x14 in PDF
    DirectPdf,

    /// Export the résumé as an image
    Image {
        #[arg(long, value_enum, default_value = "png")]
        format: ImageKind,

        /// Base filename, without date or extension
        #[arg(long, default_value = "CV")]
        filename: String,
    },

    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum EntrySection {
    Experience,
    Education,
    Skill,
    Project,
    Certification,
    Language,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum SectionName {
    Personal,
    Experience,
    Education,
    Skills,
    Projects,
    Certifications,
    Languages,
}

impl From<SectionName> for Section {
    fn from(name: SectionName) -> Self {
        match name {
            SectionName::Personal => Section::PersonalInfo,
            SectionName::Experience => Section::Experience,
            SectionName::Education => Section::Education,
            SectionName::Skills => Section::Skills,
            SectionName::Projects => Section::Projects,
            SectionName::Certifications => Section::Certifications,
            SectionName::Languages => Section::Languages,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum PageFormat {
    A4,
    Letter,
    /// 11x14 in page with compact spacing
    Oversized,
}

impl From<PageFormat> for PageSize {
    fn from(format: PageFormat) -> Self {
        match format {
            PageFormat::A4 => PageSize::A4,
            PageFormat::Letter => PageSize::Letter,
            PageFormat::Oversized => PageSize::Oversized,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Strategy {
    /// Print pipeline under a print-only page sheet
    Print,
    /// Rasterize and embed the bitmap
    Capture,
}

impl From<Strategy> for ExportStrategy {
    fn from(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Print => ExportStrategy::Print,
            Strategy::Capture => ExportStrategy::Capture,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum ImageKind {
    Png,
    #[value(alias = "jpg")]
    Jpeg,
}

impl From<ImageKind> for ImageFormat {
    fn from(kind: ImageKind) -> Self {
        match kind {
            ImageKind::Png => ImageFormat::Png,
            ImageKind::Jpeg => ImageFormat::Jpeg,
        }
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let ctx = Context {
        data_dir: cli.data_dir,
        out_dir: cli.out_dir,
        origin: cli.origin,
        public_dir: cli.public_dir,
        font_dir: cli.font_dir,
    };

    let result = match cli.command {
        Some(Commands::Init) => cmd_init(&ctx),
        Some(Commands::Info) => cmd_info(&ctx),
        Some(Commands::Import { input }) => cmd_import(&ctx, &input),
        Some(Commands::ExportJson { output, stdout }) => {
            cmd_export_json(&ctx, output.as_deref(), stdout)
        }
        Some(Commands::Personal {
            name,
            title,
            email,
            phone,
            location,
            linkedin,
            github,
            website,
            image,
            summary,
        }) => cmd_personal(
            &ctx,
            PersonalInfoPatch {
                full_name: name,
                title,
                email,
                phone,
                location,
                linkedin,
                github,
                summary,
                website,
                profile_image: image,
            },
        ),
        Some(Commands::Add { section, json }) => cmd_add(&ctx, section, &json),
        Some(Commands::Update { section, id, json }) => cmd_update(&ctx, section, id, &json),
        Some(Commands::Remove { section, id }) => cmd_remove(&ctx, section, id),
        Some(Commands::Sections { show, hide }) => cmd_sections(&ctx, &show, &hide),
        Some(Commands::Theme { json }) => cmd_theme(&ctx, &json),
        Some(Commands::Reset) => cmd_reset(&ctx),
        Some(Commands::Preview { fullscreen, output }) => {
            cmd_preview(&ctx, fullscreen, output.as_deref())
        }
        Some(Commands::Pdf {
            format,
            strategy,
            quality,
            filename,
        }) => {
            let options = ExportOptions::new()
                .with_page(format.into())
                .with_strategy(strategy.into())
                .with_quality(quality)
                .with_filename(filename);
            cmd_pdf(&ctx, format, options).await
        }
        Some(Commands::DirectPdf) => cmd_direct_pdf(&ctx).await,
        Some(Commands::Image { format, filename }) => cmd_image(&ctx, format, &filename).await,
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            println!("{}", "Usage: cvbuilder <COMMAND>".yellow());
            println!("       cvbuilder --help for more information");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

struct Context {
    data_dir: PathBuf,
    out_dir: PathBuf,
    origin: String,
    public_dir: PathBuf,
    font_dir: Option<PathBuf>,
}

impl Context {
    fn store(&self) -> Store {
        Store::new(Arc::new(FileStorage::new(&self.data_dir)))
    }

    fn exporter(&self, store: &Store) -> Exporter {
        let doc = store.document();
        let surface = surface_for(&doc, &RenderOptions::new().with_export_controls(true));
        let loaders: Vec<Arc<dyn AssetLoader>> = vec![
            Arc::new(FileAssetLoader::new(&self.public_dir, self.origin.clone())),
            Arc::new(HttpAssetLoader::new(self.origin.clone())),
        ];
        let config = ExporterConfig::new().with_asset_origin(self.origin.clone());
        Exporter::new(
            surface,
            Arc::new(FallbackAssetLoader::new(loaders)),
            Arc::new(DirectorySink::new(&self.out_dir)),
            config,
        )
        .with_rasterizer(Arc::new(self.rasterizer()))
    }

    fn rasterizer(&self) -> BoxRasterizer {
        match &self.font_dir {
            Some(dir) => {
                let mut fonts = FontBook::new();
                fonts.load_system_fonts();
                fonts.load_fonts_dir(dir);
                BoxRasterizer::new().with_fonts(Arc::new(fonts))
            }
            None => BoxRasterizer::new(),
        }
    }
}

fn report_edit(changed: bool, what: &str) {
    if changed {
        println!("{} {}", "Updated".green(), what);
    } else {
        println!("{} {}", "No change to".yellow(), what);
    }
}

fn cmd_init(ctx: &Context) -> CliResult {
    let mut store = ctx.store();
    store.dispatch(Edit::Load(Box::default()));
    store.save();
    println!(
        "{} {}",
        "Initialized résumé in".green(),
        ctx.data_dir.display()
    );
    Ok(())
}

fn cmd_info(ctx: &Context) -> CliResult {
    let store = ctx.store();
    let doc = store.document();
    let info = &doc.personal_info;

    println!("{}", "Résumé Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "Name".bold(), info.full_name);
    println!("{}: {}", "Title".bold(), info.title);
    if !info.email.is_empty() {
        println!("{}: {}", "Email".bold(), info.email);
    }
    if !info.location.is_empty() {
        println!("{}: {}", "Location".bold(), info.location);
    }
    println!("{}: {}", "Theme".bold(), doc.theme.name);
    println!("{}: {}", "Updated".bold(), doc.updated_at.format("%Y-%m-%d %H:%M"));

    println!();
    println!("{}", "Sections".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    let rows = [
        (Section::Experience, "Experience", doc.experiences.len()),
        (Section::Education, "Education", doc.education.len()),
        (Section::Skills, "Skills", doc.skills.len()),
        (Section::Projects, "Projects", doc.projects.len()),
        (Section::Certifications, "Certifications", doc.certifications.len()),
        (Section::Languages, "Languages", doc.languages.len()),
    ];
    for (section, label, count) in rows {
        let visibility = if doc.sections.is_visible(section) {
            "shown".green()
        } else {
            "hidden".dimmed()
        };
        println!("{}: {} ({})", label.bold(), count, visibility);
    }

    Ok(())
}

fn cmd_import(ctx: &Context, input: &Path) -> CliResult {
    let text = fs::read_to_string(input)?;
    let mut store = ctx.store();
    store.import_json(&text)?;
    println!("{} {}", "Imported".green(), input.display());
    Ok(())
}

fn cmd_export_json(ctx: &Context, output: Option<&Path>, stdout: bool) -> CliResult {
    let store = ctx.store();
    let export = store.export_json()?;

    if stdout {
        println!("{}", export.content);
        return Ok(());
    }

    let path = output
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| ctx.out_dir.join(&export.filename));
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, &export.content)?;
    println!("{} {}", "Saved to".green(), path.display());
    Ok(())
}

fn cmd_personal(ctx: &Context, patch: PersonalInfoPatch) -> CliResult {
    let mut store = ctx.store();
    let changed = store.dispatch(Edit::UpdatePersonalInfo(patch));
    report_edit(changed, "personal information");
    Ok(())
}

/// Parse an entry, filling in a time-based id when none is given.
fn parse_entry<T: serde::de::DeserializeOwned>(json: &str) -> Result<T, serde_json::Error> {
    let mut value: serde_json::Value = serde_json::from_str(json)?;
    if let Some(obj) = value.as_object_mut() {
        if !obj.contains_key("id") {
            let millis = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or_default();
            obj.insert("id".to_string(), serde_json::Value::String(millis.to_string()));
        }
    }
    serde_json::from_value(value)
}

fn cmd_add(ctx: &Context, section: EntrySection, json: &str) -> CliResult {
    let edit = match section {
        EntrySection::Experience => Edit::AddExperience(parse_entry::<Experience>(json)?),
        EntrySection::Education => Edit::AddEducation(parse_entry::<Education>(json)?),
        EntrySection::Skill => Edit::AddSkill(parse_entry::<Skill>(json)?),
        EntrySection::Project => Edit::AddProject(parse_entry::<Project>(json)?),
        EntrySection::Certification => Edit::AddCertification(parse_entry::<Certification>(json)?),
        EntrySection::Language => Edit::AddLanguage(parse_entry::<Language>(json)?),
    };
    let mut store = ctx.store();
    let changed = store.dispatch(edit);
    report_edit(changed, "entries");
    Ok(())
}

fn cmd_update(ctx: &Context, section: EntrySection, id: String, json: &str) -> CliResult {
    let edit = match section {
        EntrySection::Experience => Edit::UpdateExperience {
            id,
            patch: serde_json::from_str(json)?,
        },
        EntrySection::Education => Edit::UpdateEducation {
            id,
            patch: serde_json::from_str(json)?,
        },
        EntrySection::Skill => Edit::UpdateSkill {
            id,
            patch: serde_json::from_str(json)?,
        },
        EntrySection::Project => Edit::UpdateProject {
            id,
            patch: serde_json::from_str(json)?,
        },
        EntrySection::Certification => Edit::UpdateCertification {
            id,
            patch: serde_json::from_str(json)?,
        },
        EntrySection::Language => Edit::UpdateLanguage {
            id,
            patch: serde_json::from_str(json)?,
        },
    };
    let mut store = ctx.store();
    let changed = store.dispatch(edit);
    report_edit(changed, "entry");
    Ok(())
}

fn cmd_remove(ctx: &Context, section: EntrySection, id: String) -> CliResult {
    let edit = match section {
        EntrySection::Experience => Edit::DeleteExperience(id.clone()),
        EntrySection::Education => Edit::DeleteEducation(id.clone()),
        EntrySection::Skill => Edit::DeleteSkill(id.clone()),
        EntrySection::Project => Edit::DeleteProject(id.clone()),
        EntrySection::Certification => Edit::DeleteCertification(id.clone()),
        EntrySection::Language => Edit::DeleteLanguage(id.clone()),
    };
    let mut store = ctx.store();
    if store.dispatch(edit) {
        println!("{} {}", "Removed".green(), id);
    } else {
        println!("{} {}", "No entry with id".yellow(), id);
    }
    Ok(())
}

fn cmd_sections(ctx: &Context, show: &[SectionName], hide: &[SectionName]) -> CliResult {
    let mut patch = SectionsPatch::default();
    let flags = show
        .iter()
        .map(|s| (*s, true))
        .chain(hide.iter().map(|s| (*s, false)));
    for (name, visible) in flags {
        let single = SectionsPatch::single(name.into(), visible);
        patch = merge_sections(patch, single);
    }

    let mut store = ctx.store();
    let changed = store.dispatch(Edit::UpdateSections(patch));
    report_edit(changed, "section visibility");
    Ok(())
}

fn merge_sections(base: SectionsPatch, next: SectionsPatch) -> SectionsPatch {
    SectionsPatch {
        show_personal_info: next.show_personal_info.or(base.show_personal_info),
        show_experience: next.show_experience.or(base.show_experience),
        show_education: next.show_education.or(base.show_education),
        show_skills: next.show_skills.or(base.show_skills),
        show_projects: next.show_projects.or(base.show_projects),
        show_certifications: next.show_certifications.or(base.show_certifications),
        show_languages: next.show_languages.or(base.show_languages),
    }
}

fn cmd_theme(ctx: &Context, json: &str) -> CliResult {
    let theme: Theme = serde_json::from_str(json)?;
    let mut store = ctx.store();
    let changed = store.dispatch(Edit::UpdateTheme(theme));
    report_edit(changed, "theme");
    Ok(())
}

fn cmd_reset(ctx: &Context) -> CliResult {
    let mut store = ctx.store();
    let changed = store.dispatch(Edit::Reset);
    report_edit(changed, "résumé (reset to defaults)");
    Ok(())
}

fn cmd_preview(ctx: &Context, fullscreen: bool, output: Option<&Path>) -> CliResult {
    let store = ctx.store();
    let mut options = RenderOptions::new();
    if fullscreen {
        options = options.fullscreen();
    }
    let html = cvbuilder::to_html(&store.document(), &options)?;

    if let Some(path) = output {
        fs::write(path, &html)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", html);
    }
    Ok(())
}

async fn cmd_pdf(ctx: &Context, format: PageFormat, options: ExportOptions) -> CliResult {
    let store = ctx.store();
    let exporter = ctx.exporter(&store);
    let watcher = watch_progress(exporter.subscribe());

    let result = if format == PageFormat::Oversized && options.strategy == ExportStrategy::Print {
        exporter.export_oversized(ROOT_ID, &options.filename).await
    } else {
        exporter.export_document(ROOT_ID, &options).await
    };
    finish(watcher, result, &ctx.out_dir)
}

async fn cmd_direct_pdf(ctx: &Context) -> CliResult {
    let store = ctx.store();
    let exporter = ctx.exporter(&store);
    let watcher = watch_progress(exporter.subscribe());

    let full_name = store.document().personal_info.full_name.clone();
    let result = exporter.export_direct_pdf(ROOT_ID, &full_name).await;
    finish(watcher, result, &ctx.out_dir)
}

async fn cmd_image(ctx: &Context, format: ImageKind, base: &str) -> CliResult {
    let store = ctx.store();
    let exporter = ctx.exporter(&store);
    let watcher = watch_progress(exporter.subscribe());

    let result = exporter.export_image(ROOT_ID, format.into(), base).await;
    finish(watcher, result, &ctx.out_dir)
}

struct ProgressWatcher {
    bar: ProgressBar,
    task: tokio::task::JoinHandle<()>,
}

/// Mirror export job progress onto a progress bar.
fn watch_progress(mut rx: watch::Receiver<ExportJob>) -> ProgressWatcher {
    let bar = ProgressBar::new(100);
    if let Ok(style) =
        ProgressStyle::default_bar().template("{spinner:.green} [{bar:40.cyan/blue}] {pos:>3}% {msg}")
    {
        bar.set_style(style.progress_chars("#>-"));
    }

    let handle = bar.clone();
    let task = tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let job = rx.borrow_and_update().clone();
            if let Some(stage) = job.stage {
                handle.set_message(stage.label());
            }
            handle.set_position(u64::from(job.progress));
        }
    });

    ProgressWatcher { bar, task }
}

fn finish(watcher: ProgressWatcher, result: ExportResult, out_dir: &Path) -> CliResult {
    watcher.task.abort();

    if result.success {
        watcher.bar.finish_with_message("Done!");
        println!("\n{}", result.message.green().bold());
        if let Some(filename) = result.filename {
            println!("  {} {}", "└─".dimmed(), out_dir.join(filename).display());
        }
        Ok(())
    } else {
        watcher.bar.abandon_with_message("Failed");
        Err(result.message.into())
    }
}

fn cmd_version() {
    println!("{} {}", "cvbuilder".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Single-page résumé builder");
    println!();
    println!("Storage key: {}", cvbuilder::STORAGE_KEY.dimmed());
    println!("Export formats: PDF (A4, Letter, 11x14), PNG, JPEG");
    println!("License: MIT");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_entry_generates_id() {
        let skill: Skill = parse_entry(r#"{"name":"Rust","category":"language"}"#).unwrap();
        assert!(!skill.id.is_empty());
        assert_eq!(skill.name, "Rust");
    }

    #[test]
    fn test_parse_entry_keeps_id() {
        let lang: Language = parse_entry(r#"{"id":"l1","name":"French"}"#).unwrap();
        assert_eq!(lang.id, "l1");
    }

    #[test]
    fn test_merge_sections() {
        let a = SectionsPatch::single(Section::Skills, false);
        let b = SectionsPatch::single(Section::Projects, true);
        let merged = merge_sections(a, b);
        assert_eq!(merged.show_skills, Some(false));
        assert_eq!(merged.show_projects, Some(true));
        assert_eq!(merged.show_languages, None);
    }

    #[test]
    fn test_cli_parses_pdf_args() {
        let cli = Cli::parse_from(["cvbuilder", "pdf", "--format", "letter"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Pdf {
                format: PageFormat::Letter,
                ..
            })
        ));
    }

    #[test]
    fn test_export_json_and_import_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = Context {
            data_dir: dir.path().join("data"),
            out_dir: dir.path().join("out"),
            origin: DEFAULT_ORIGIN.to_string(),
            public_dir: dir.path().join("public"),
            font_dir: None,
        };
        cmd_personal(
            &ctx,
            PersonalInfoPatch {
                full_name: Some("Ada Lovelace".into()),
                ..Default::default()
            },
        )
        .unwrap();
        cmd_export_json(&ctx, None, false).unwrap();
        let path = ctx.out_dir.join("Ada_Lovelace_CV.json");
        assert!(path.exists());

        cmd_reset(&ctx).unwrap();
        assert_eq!(ctx.store().document().personal_info.full_name, "Your Name");
        cmd_import(&ctx, &path).unwrap();
        assert_eq!(
            ctx.store().document().personal_info.full_name,
            "Ada Lovelace"
        );
    }
}
