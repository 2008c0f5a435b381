//! Technology-name to icon lookup.

/// Icon used when a technology has no dedicated icon.
pub const FALLBACK_ICON: &str = "code";

const TECH_ICONS: &[(&str, &str)] = &[
    // Programming languages
    ("Java", "openjdk"),
    ("JavaScript", "javascript"),
    ("TypeScript", "typescript"),
    ("Python", "python"),
    ("Kotlin", "kotlin"),
    ("C#", "csharp"),
    ("Csharp", "csharp"),
    ("Rust", "rust"),
    ("Go", "go"),
    // Frontend
    ("React", "react"),
    ("Next.js", "nextdotjs"),
    ("NextJs", "nextdotjs"),
    ("Angular", "angular"),
    ("Tailwind CSS", "tailwindcss"),
    ("Sass", "sass"),
    ("HTML", "html5"),
    ("HTML5", "html5"),
    ("CSS", "css3"),
    ("CSS3", "css3"),
    ("Ionic", "angular"),
    // Backend
    ("Spring Boot", "spring"),
    ("Spring", "spring"),
    ("WebFlux", "spring"),
    ("Node.js", "nodedotjs"),
    ("NodeJS", "nodedotjs"),
    ("NestJS", "nestjs"),
    (".Net", "dotnet"),
    ("dotnet", "dotnet"),
    ("Flask", "flask"),
    ("Django", "django"),
    ("RxJava", "openjdk"),
    // Databases and messaging
    ("MySQL", "mysql"),
    ("PostgreSQL", "postgresql"),
    ("MongoDB", "mongodb"),
    ("Redis", "redis"),
    ("RabbitMQ", "rabbitmq"),
    ("Supabase", "supabase"),
    ("DynamoDB", "amazon"),
    // Cloud and DevOps
    ("AWS", "amazon"),
    ("Azure", "cloud"),
    ("GCP", "googlecloud"),
    ("Docker", "docker"),
    ("Kubernetes", "kubernetes"),
    ("GitHub", "github"),
    ("Git", "git"),
    ("Jenkins", "jenkins"),
    ("Terraform", "terraform"),
    ("SonarQube", "sonarqube"),
    ("New Relic", "cloud"),
    ("KeyCloak", "cog"),
    // Testing and tools
    ("JUnit", "junit5"),
    ("Mockito", "junit5"),
    ("Jest", "jest"),
    ("Selenium", "selenium"),
    ("Postman", "postman"),
    ("Figma", "figma"),
    ("Jira", "jira"),
    ("Eclipse", "eclipseide"),
    ("Karate", "testtube"),
    ("TDD", "testtube"),
    ("BDD", "testtube"),
    ("Kluwan", "tools"),
    ("CheckStyle", "code"),
    // AI
    ("AI", "robot"),
    ("OpenAI", "openai"),
    ("OpenAI API", "openai"),
    ("Machine Learning", "brain"),
    // Practices
    ("Microservices", "code"),
    ("WebSockets", "code"),
    ("Scrumban", "cog"),
];

/// Look up the icon for a technology name. Matching is exact.
pub fn icon_for(technology: &str) -> &'static str {
    TECH_ICONS
        .iter()
        .find(|(name, _)| *name == technology)
        .map(|(_, icon)| *icon)
        .unwrap_or(FALLBACK_ICON)
}

/// Whether a technology has a dedicated icon.
pub fn has_icon(technology: &str) -> bool {
    TECH_ICONS.iter().any(|(name, _)| *name == technology)
}
