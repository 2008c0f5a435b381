//! Utility class palette installed as the base style sheets of every surface.
//!
//! Color utilities are declared in OKLCH. Each one carries the RGB value
//! it should be pinned to when a consumer cannot interpret OKLCH.

use super::{Declaration, Media, Selector, StyleSheet};

/// Id of the always-on utility sheet.
pub const BASE_SHEET_ID: &str = "utilities";
/// Id of the `md:` utility sheet.
pub const MEDIUM_SHEET_ID: &str = "utilities-md";
/// Id of the `lg:` utility sheet.
pub const LARGE_SHEET_ID: &str = "utilities-lg";

/// Viewport width at which `md:` utilities apply.
pub const MEDIUM_BREAKPOINT: u32 = 768;
/// Viewport width at which `lg:` utilities apply.
pub const LARGE_BREAKPOINT: u32 = 1024;

/// A color utility class and its two spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorUtility {
    pub class: &'static str,
    pub property: &'static str,
    pub oklch: &'static str,
    pub rgb: &'static str,
}

const fn color(
    class: &'static str,
    property: &'static str,
    oklch: &'static str,
    rgb: &'static str,
) -> ColorUtility {
    ColorUtility {
        class,
        property,
        oklch,
        rgb,
    }
}

/// Every color utility known to the palette.
pub const COLOR_UTILITIES: &[ColorUtility] = &[
    color("text-white", "color", "oklch(100% 0 0)", "#ffffff"),
    color("text-gray-900", "color", "oklch(21% 0.034 264.665)", "#111827"),
    color("text-gray-800", "color", "oklch(27.8% 0.033 256.848)", "#1f2937"),
    color("text-gray-700", "color", "oklch(37.3% 0.034 259.733)", "#374151"),
    color("text-gray-600", "color", "oklch(44.6% 0.03 256.802)", "#4b5563"),
    color("text-gray-500", "color", "oklch(55.1% 0.027 264.364)", "#6b7280"),
    color("text-blue-200", "color", "oklch(88.2% 0.059 254.128)", "#bfdbfe"),
    color("text-blue-300", "color", "oklch(80.9% 0.105 251.813)", "#93c5fd"),
    color("text-blue-600", "color", "oklch(54.6% 0.245 262.881)", "#2563eb"),
    color("text-blue-700", "color", "oklch(48.8% 0.243 264.376)", "#1d4ed8"),
    color("text-yellow-400", "color", "oklch(85.2% 0.199 91.936)", "#facc15"),
    color("bg-white", "background-color", "oklch(100% 0 0)", "#ffffff"),
    color("bg-gray-50", "background-color", "oklch(98.5% 0.002 247.839)", "#f9fafb"),
    color("bg-gray-100", "background-color", "oklch(96.7% 0.003 264.542)", "#f3f4f6"),
    color("bg-gray-600", "background-color", "oklch(44.6% 0.03 256.802)", "#4b5563"),
    color("bg-gray-900", "background-color", "oklch(21% 0.034 264.665)", "#111827"),
    color("bg-blue-600", "background-color", "oklch(54.6% 0.245 262.881)", "#2563eb"),
    color("bg-blue-700", "background-color", "oklch(48.8% 0.243 264.376)", "#1d4ed8"),
    color("bg-green-600", "background-color", "oklch(62.7% 0.194 149.214)", "#16a34a"),
    color("bg-green-700", "background-color", "oklch(52.7% 0.154 150.069)", "#15803d"),
    color("from-blue-50", "--gradient-from", "oklch(97% 0.014 254.604)", "#eff6ff"),
    color("to-blue-100", "--gradient-to", "oklch(93.2% 0.032 255.585)", "#dbeafe"),
    color("border-gray-200", "border-color", "oklch(92.8% 0.006 264.531)", "#e5e7eb"),
    color("border-gray-300", "border-color", "oklch(87.2% 0.01 258.338)", "#d1d5db"),
    color("border-blue-200", "border-color", "oklch(88.2% 0.059 254.128)", "#bfdbfe"),
    color("border-blue-600", "border-color", "oklch(54.6% 0.245 262.881)", "#2563eb"),
];

/// Look up the color utility declared by `class`.
pub fn color_utility(class: &str) -> Option<&'static ColorUtility> {
    COLOR_UTILITIES.iter().find(|c| c.class == class)
}

type Utility = (&'static str, &'static [(&'static str, &'static str)]);

const UTILITIES: &[Utility] = &[
    // Layout
    ("grid", &[("display", "grid")]),
    ("grid-cols-1", &[("grid-template-columns", "repeat(1, minmax(0, 1fr))")]),
    ("flex", &[("display", "flex")]),
    ("inline-flex", &[("display", "inline-flex")]),
    ("flex-col", &[("flex-direction", "column")]),
    ("flex-wrap", &[("flex-wrap", "wrap")]),
    ("flex-grow", &[("flex-grow", "1")]),
    ("flex-shrink-0", &[("flex-shrink", "0")]),
    ("items-center", &[("align-items", "center")]),
    ("items-start", &[("align-items", "flex-start")]),
    ("justify-between", &[("justify-content", "space-between")]),
    ("justify-center", &[("justify-content", "center")]),
    ("overflow-hidden", &[("overflow", "hidden")]),
    ("gap-0", &[("gap", "0")]),
    ("gap-2", &[("gap", "0.5rem")]),
    ("gap-3", &[("gap", "0.75rem")]),
    ("gap-4", &[("gap", "1rem")]),
    ("gap-6", &[("gap", "1.5rem")]),
    ("space-y-1", &[("--space-y", "0.25rem")]),
    ("space-y-2", &[("--space-y", "0.5rem")]),
    ("space-y-3", &[("--space-y", "0.75rem")]),
    ("space-y-4", &[("--space-y", "1rem")]),
    ("space-x-4", &[("--space-x", "1rem")]),
    // Sizing
    ("w-full", &[("width", "100%")]),
    ("h-full", &[("height", "100%")]),
    ("w-32", &[("width", "8rem")]),
    ("h-32", &[("height", "8rem")]),
    ("w-12", &[("width", "3rem")]),
    ("h-12", &[("height", "3rem")]),
    ("w-6", &[("width", "1.5rem")]),
    ("h-6", &[("height", "1.5rem")]),
    ("w-5", &[("width", "1.25rem")]),
    ("h-5", &[("height", "1.25rem")]),
    ("w-4", &[("width", "1rem")]),
    ("h-4", &[("height", "1rem")]),
    ("w-3", &[("width", "0.75rem")]),
    ("h-3", &[("height", "0.75rem")]),
    ("w-2", &[("width", "0.5rem")]),
    ("h-2", &[("height", "0.5rem")]),
    ("w-1", &[("width", "0.25rem")]),
    ("h-1", &[("height", "0.25rem")]),
    ("max-w-5xl", &[("max-width", "64rem")]),
    ("min-h-screen", &[("min-height", "100vh")]),
    ("mx-auto", &[("margin-left", "auto"), ("margin-right", "auto")]),
    // Spacing
    ("p-6", &[("padding", "1.5rem")]),
    ("p-8", &[("padding", "2rem")]),
    ("px-2", &[("padding-left", "0.5rem"), ("padding-right", "0.5rem")]),
    ("px-3", &[("padding-left", "0.75rem"), ("padding-right", "0.75rem")]),
    ("py-1", &[("padding-top", "0.25rem"), ("padding-bottom", "0.25rem")]),
    ("py-2", &[("padding-top", "0.5rem"), ("padding-bottom", "0.5rem")]),
    ("pb-2", &[("padding-bottom", "0.5rem")]),
    ("pt-2", &[("padding-top", "0.5rem")]),
    ("mb-2", &[("margin-bottom", "0.5rem")]),
    ("mb-3", &[("margin-bottom", "0.75rem")]),
    ("mb-4", &[("margin-bottom", "1rem")]),
    ("mb-6", &[("margin-bottom", "1.5rem")]),
    ("mb-8", &[("margin-bottom", "2rem")]),
    ("mt-1", &[("margin-top", "0.25rem")]),
    ("mt-2", &[("margin-top", "0.5rem")]),
    ("mt-3", &[("margin-top", "0.75rem")]),
    ("mt-auto", &[("margin-top", "auto")]),
    ("mr-1", &[("margin-right", "0.25rem")]),
    ("mr-2", &[("margin-right", "0.5rem")]),
    ("mr-3", &[("margin-right", "0.75rem")]),
    ("ml-4", &[("margin-left", "1rem")]),
    // Typography
    ("text-xs", &[("font-size", "0.75rem"), ("line-height", "1rem")]),
    ("text-sm", &[("font-size", "0.875rem"), ("line-height", "1.25rem")]),
    ("text-base", &[("font-size", "1rem"), ("line-height", "1.5rem")]),
    ("text-lg", &[("font-size", "1.125rem"), ("line-height", "1.75rem")]),
    ("text-xl", &[("font-size", "1.25rem"), ("line-height", "1.75rem")]),
    ("text-2xl", &[("font-size", "1.5rem"), ("line-height", "2rem")]),
    ("text-3xl", &[("font-size", "1.875rem"), ("line-height", "2.25rem")]),
    ("text-6xl", &[("font-size", "3.75rem"), ("line-height", "1")]),
    ("font-medium", &[("font-weight", "500")]),
    ("font-semibold", &[("font-weight", "600")]),
    ("font-bold", &[("font-weight", "700")]),
    ("leading-relaxed", &[("line-height", "1.625")]),
    ("text-center", &[("text-align", "center")]),
    ("text-right", &[("text-align", "right")]),
    // Borders and effects
    ("border", &[("border-width", "1px"), ("border-style", "solid")]),
    ("border-b-2", &[("border-bottom-width", "2px"), ("border-bottom-style", "solid")]),
    ("border-l-4", &[("border-left-width", "4px"), ("border-left-style", "solid")]),
    ("rounded", &[("border-radius", "0.25rem")]),
    ("rounded-md", &[("border-radius", "0.375rem")]),
    ("rounded-lg", &[("border-radius", "0.5rem")]),
    ("rounded-full", &[("border-radius", "9999px")]),
    ("shadow-sm", &[("box-shadow", "0 1px 2px 0 rgb(0 0 0 / 0.05)")]),
    ("shadow-2xl", &[("box-shadow", "0 25px 50px -12px rgb(0 0 0 / 0.25)")]),
    ("object-cover", &[("object-fit", "cover")]),
    ("object-contain", &[("object-fit", "contain")]),
    (
        "bg-gradient-to-br",
        &[(
            "background-image",
            "linear-gradient(to bottom right, var(--gradient-from), var(--gradient-to))",
        )],
    ),
];

const MEDIUM_UTILITIES: &[Utility] = &[
    ("md:grid-cols-2", &[("grid-template-columns", "repeat(2, minmax(0, 1fr))")]),
    ("md:flex-row", &[("flex-direction", "row")]),
    ("md:justify-between", &[("justify-content", "space-between")]),
    ("md:items-start", &[("align-items", "flex-start")]),
    ("md:mt-0", &[("margin-top", "0")]),
    ("md:text-right", &[("text-align", "right")]),
];

const LARGE_UTILITIES: &[Utility] = &[
    ("lg:grid-cols-3", &[("grid-template-columns", "repeat(3, minmax(0, 1fr))")]),
    ("lg:col-span-1", &[("grid-column", "span 1 / span 1")]),
    ("lg:col-span-2", &[("grid-column", "span 2 / span 2")]),
];

fn sheet_from(id: &str, media: Media, utilities: &[Utility]) -> StyleSheet {
    let mut sheet = StyleSheet::new(id, media);
    for (class, declarations) in utilities {
        sheet.push_rule(
            Selector::class(class),
            declarations
                .iter()
                .map(|(p, v)| Declaration::new(p, *v))
                .collect(),
        );
    }
    sheet
}

/// The always-on utility sheet, colors included.
pub fn base_sheet() -> StyleSheet {
    let mut sheet = sheet_from(BASE_SHEET_ID, Media::All, UTILITIES);
    for utility in COLOR_UTILITIES {
        sheet.push_rule(
            Selector::class(utility.class),
            vec![Declaration::new(utility.property, utility.oklch)],
        );
    }
    for (class, property, var) in [
        ("space-y-1", "margin-top", "--space-y"),
        ("space-y-2", "margin-top", "--space-y"),
        ("space-y-3", "margin-top", "--space-y"),
        ("space-y-4", "margin-top", "--space-y"),
        ("space-x-4", "margin-left", "--space-x"),
    ] {
        sheet.push_rule(
            Selector::Raw(format!(".{} > * + *", class)),
            vec![Declaration::new(property, format!("var({})", var))],
        );
    }
    sheet
}

/// Every base sheet in cascade order: base, `md:`, `lg:`.
pub fn base_sheets() -> Vec<StyleSheet> {
    vec![
        base_sheet(),
        sheet_from(
            MEDIUM_SHEET_ID,
            Media::MinWidth(MEDIUM_BREAKPOINT),
            MEDIUM_UTILITIES,
        ),
        sheet_from(
            LARGE_SHEET_ID,
            Media::MinWidth(LARGE_BREAKPOINT),
            LARGE_UTILITIES,
        ),
    ]
}
