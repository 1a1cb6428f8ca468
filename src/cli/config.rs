use crate::error::Result;
use crate::settings::{load_settings, save_settings, settings_path};

pub fn show() -> Result<()> {
    let settings = load_settings();
    let org = if settings.organization_name.is_empty() {
        "(not set)"
    } else {
        &settings.organization_name
    };
    println!("Settings:      {}", settings_path().display());
    println!("Organization:  {org}");
    println!("Export dir:    {}", settings.export_dir);
    Ok(())
}

pub fn set(organization_name: Option<String>, export_dir: Option<String>) -> Result<()> {
    let mut settings = load_settings();
    if let Some(name) = organization_name {
        settings.organization_name = name.trim().to_string();
    }
    if let Some(dir) = export_dir {
        settings.export_dir = dir;
    }
    save_settings(&settings)?;
    println!("Saved {}", settings_path().display());
    Ok(())
}
