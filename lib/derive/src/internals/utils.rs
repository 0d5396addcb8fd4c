use std::io::{self, Write};
use std::process::{Command, Stdio};

use proc_macro2::TokenStream;
use syn::{GenericParam, Generics, TypeParamBound};

/// Set to `1` to print every expansion, or to a comma separated list of type names
const DUMP_VARIABLE: &str = "ERASED_REFLECT_DUMP";

/// If the expansion for `target` should be printed
fn dump_requested(setting: Option<&str>, target: &str) -> bool {
    match setting.map(str::trim) {
        None | Some("") | Some("0") => false,
        Some("1") | Some("all") => true,
        Some(names) => names.split(',').any(|name| name.trim() == target),
    }
}

/// Print the expansion of a derive to stderr, when requested through the environment
pub fn dump_expansion(target: &syn::Ident, expansion: &TokenStream) {
    let setting = std::env::var(DUMP_VARIABLE).ok();
    let target = target.to_string();
    if !dump_requested(setting.as_deref(), &target) {
        return;
    }
    let code = expansion.to_string();
    eprintln!("#[derive(Reflect)] for {target}:");
    match rustfmt(&code) {
        Ok(formatted) => eprintln!("{formatted}"),
        Err(error) => eprintln!("{code}\n(unformatted: {error})"),
    }
}

/// Pipe code through `rustfmt`
fn rustfmt(code: &str) -> io::Result<String> {
    let mut child = Command::new("rustfmt")
        .args(["--edition", "2021"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;
    child
        .stdin
        .take()
        .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "rustfmt has no stdin"))?
        .write_all(code.as_bytes())?;
    let output = child.wait_with_output()?;
    if !output.status.success() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            String::from_utf8_lossy(&output.stderr).into_owned(),
        ));
    }
    String::from_utf8(output.stdout).map_err(|error| io::Error::new(io::ErrorKind::InvalidData, error))
}

pub fn add_type_bounds(generics: &Generics, bounds: &[TypeParamBound]) -> Generics {
    let mut generics = generics.clone();
    for param in &mut generics.params {
        if let GenericParam::Type(ref mut type_param) = *param {
            type_param.bounds.extend(bounds.iter().cloned());
        }
    }
    generics
}

#[cfg(test)]
mod test {
    use super::dump_requested;

    #[test]
    fn dump_setting() {
        assert!(!dump_requested(None, "Point"));
        assert!(!dump_requested(Some("0"), "Point"));
        assert!(dump_requested(Some("1"), "Point"));
        assert!(dump_requested(Some("Line, Point"), "Point"));
        assert!(!dump_requested(Some("Line"), "Point"));
    }
}
