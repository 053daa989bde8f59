// ABOUTME: Manifest scaffolding for new installations.
// ABOUTME: Writes a vaultship.yml template with the built-in service catalog.

use std::path::Path;

use crate::error::{Error, Result};

use super::{MANIFEST_FILENAME, Manifest};

pub fn init_manifest(dir: &Path, force: bool) -> Result<()> {
    let manifest_path = dir.join(MANIFEST_FILENAME);

    if manifest_path.exists() && !force {
        return Err(Error::AlreadyExists(manifest_path));
    }

    let yaml = template_yaml(&Manifest::template());
    std::fs::write(&manifest_path, yaml)?;

    Ok(())
}

fn template_yaml(manifest: &Manifest) -> String {
    let mut out = String::new();
    out.push_str(&format!("hardware_id: \"{}\"\n", manifest.hardware_id));
    out.push_str("crypto:\n  command: [\"vaultcrypt\"]\n  prompt: false\n");
    out.push_str(
        "# registry:\n#   server: registry.example.com\n#   username: deploy\n#   password:\n#     env: VAULTSHIP_REGISTRY_PASS\n",
    );
    out.push_str("# store:\n#   command: [\"aws\", \"s3\", \"cp\"]\n");
    out.push_str("services:\n");
    for service in &manifest.services {
        out.push_str(&format!("  - name: {}\n", service.name));
        out.push_str(&format!("    image: {}\n", service.image));
        out.push_str(&format!("    port: {}\n", service.port));
        out.push_str(&format!("    env_file: {}\n", service.env_file.display()));
        out.push_str(&format!("    log_dir: {}\n", service.log_dir.display()));
        if let Some(ref transform) = service.transform {
            let kind = match transform.kind {
                super::TransformKind::Credential => "credential",
                super::TransformKind::HardwareId => "hardware-id",
            };
            out.push_str("    transform:\n");
            out.push_str(&format!("      kind: {kind}\n"));
            out.push_str(&format!("      field: {}\n", transform.field));
            out.push_str(&format!("      marker: {}\n", transform.marker));
        }
    }
    out
}
