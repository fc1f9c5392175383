use std::fs;
use std::path::Path;

use goblin::mach::Mach;
use goblin::Object;

use crate::deps::DependencyResolver;
use crate::process::ToolError;

/// Reads `DT_NEEDED` entries, PE import DLLs and Mach-O dylib load commands
/// directly with goblin, without any external tool.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeResolver;

impl DependencyResolver for NativeResolver {
    fn dependencies(&self, path: &Path) -> Result<Vec<String>, ToolError> {
        let bytes = fs::read(path)
            .map_err(|source| ToolError::Input { path: path.to_path_buf(), source })?;
        let invalid =
            |message: String| ToolError::Invalid { program: self.name().to_string(), message };

        match Object::parse(&bytes).map_err(|e| invalid(format!("{}: {e}", path.display())))? {
            Object::Elf(elf) => Ok(elf.libraries.iter().map(|s| s.to_string()).collect()),
            Object::PE(pe) => Ok(pe.libraries.iter().map(|s| s.to_string()).collect()),
            // goblin lists the image itself as "self" in front of the real dylibs.
            Object::Mach(Mach::Binary(macho)) => Ok(macho
                .libs
                .iter()
                .filter(|lib| **lib != "self")
                .map(|s| s.to_string())
                .collect()),
            Object::Mach(Mach::Fat(_)) => {
                Err(invalid(format!("{}: universal binaries are not supported", path.display())))
            }
            _ => Err(invalid(format!("{}: not a linked executable or library", path.display()))),
        }
    }

    fn name(&self) -> &'static str {
        "native"
    }
}
