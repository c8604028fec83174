use sovran_propbag::{
    property_enum, serialization::text, PropertyBag, PropertyDescriptor, PropertyError, StringSet,
    TypedPropertyBag,
};

property_enum! {
    pub enum Placement {
        Inside,
        Outside,
    }
}

// Each rule declares its own options; none of them knows about the others.
struct CopyrightRule;

impl CopyrightRule {
    const ENABLED: PropertyDescriptor<bool> = PropertyDescriptor::new("Copyright", "Enabled", true);
    const HEADER: PropertyDescriptor<Option<String>> =
        PropertyDescriptor::new("Copyright", "Header", None);
    const SKIPPED: PropertyDescriptor<StringSet> =
        PropertyDescriptor::with_factory("Copyright", "Skipped", StringSet::new);

    fn describe(options: &mut PropertyBag) -> Result<String, PropertyError> {
        if !options.get_property(&Self::ENABLED)? {
            return Ok("copyright: disabled".to_string());
        }
        let header = options
            .get_property(&Self::HEADER)?
            .unwrap_or_else(|| "<none>".to_string());
        let skipped = options.get_property(&Self::SKIPPED)?;
        Ok(format!(
            "copyright: header {:?}, skipping {} file(s)",
            header,
            skipped.len()
        ))
    }
}

struct UsingsRule;

impl UsingsRule {
    const SYSTEM: PropertyDescriptor<Placement> =
        PropertyDescriptor::new("Usings", "System", Placement::Outside);
    const PROJECT: PropertyDescriptor<Placement> =
        PropertyDescriptor::new("Usings", "Project", Placement::Outside);
    const GROUPS: PropertyDescriptor<TypedPropertyBag<Placement>> =
        PropertyDescriptor::with_factory("Usings", "Groups", TypedPropertyBag::new);

    fn describe(options: &mut PropertyBag) -> Result<String, PropertyError> {
        let mut groups = options.get_property(&Self::GROUPS)?;
        Ok(format!(
            "usings: system {}, project {}",
            groups.get_property(&Self::SYSTEM)?,
            groups.get_property(&Self::PROJECT)?
        ))
    }
}

fn main() -> Result<(), PropertyError> {
    let mut options = PropertyBag::new();

    println!("Defaults:");
    println!("  {}", CopyrightRule::describe(&mut options)?);
    println!("  {}", UsingsRule::describe(&mut options)?);
    println!("  explicit entries: {}", options.len());

    options.set_property(&CopyrightRule::HEADER, Some("Copyright (c) Sovran".to_string()))?;
    options.with_property_mut(&CopyrightRule::SKIPPED, |skipped| {
        skipped.insert("generated.rs");
        skipped.insert("bindings.rs");
    })?;
    options.with_property_mut(&UsingsRule::GROUPS, |groups| {
        groups.set_property(&UsingsRule::SYSTEM, Placement::Inside)
    })??;

    println!("\nCustomized:");
    println!("  {}", CopyrightRule::describe(&mut options)?);
    println!("  {}", UsingsRule::describe(&mut options)?);

    let document = text::to_string(&options, "FormatterOptions")?;
    println!("\nSaved document:\n{}", document);

    let path = std::env::temp_dir().join("sovran-propbag-demo.toml");
    options.save_to(&path, "FormatterOptions")?;

    let mut reloaded = PropertyBag::new();
    reloaded.load_from(&path)?;
    std::fs::remove_file(&path)?;

    println!("Reloaded {} entries, equal: {}", reloaded.len(), reloaded == options);
    println!("  {}", UsingsRule::describe(&mut reloaded)?);

    Ok(())
}
