//! Post-resolution repair adding the platform specific SWT fragment.
//!
//! The SWT implementation lives in per-platform fragments that no bundle
//! requires explicitly, so the solver never selects one on its own.

use std::sync::Arc;

use crate::error::{P2Error, Result};
use crate::metadata::{namespace, InstallableUnit, SelectionContext};

pub const SWT_HOST: &str = "org.eclipse.swt";

/// Check if a unit is the SWT host or one of its fragments
fn is_swt(unit: &InstallableUnit) -> bool {
    unit.id() == SWT_HOST || is_swt_fragment(unit)
}

fn is_swt_fragment(unit: &InstallableUnit) -> bool {
    unit.capabilities_in(namespace::OSGI_FRAGMENT)
        .any(|c| c.name() == SWT_HOST)
}

/// An SWT fragment carrying code rather than only translations
pub fn is_swt_implementation_fragment(unit: &InstallableUnit) -> bool {
    is_swt_fragment(unit) && unit.capabilities_in(namespace::JAVA_PACKAGE).next().is_some()
}

/// Add the matching SWT implementation fragment to a selection.
///
/// Nothing happens when neither the selection nor the roots reference SWT,
/// or when an implementation fragment is already among them.
pub fn fix_swt(
    selected: &mut Vec<Arc<InstallableUnit>>,
    roots: &[Arc<InstallableUnit>],
    available: &[Arc<InstallableUnit>],
    context: &SelectionContext,
) -> Result<()> {
    let mut referenced = selected.iter().chain(roots.iter());
    if !referenced.any(|u| is_swt(u)) {
        return Ok(());
    }

    if selected
        .iter()
        .chain(roots.iter())
        .any(|u| is_swt_implementation_fragment(u))
    {
        log::debug!("SWT implementation fragment already selected");
        return Ok(());
    }

    let fragment = available
        .iter()
        .filter(|u| is_swt_implementation_fragment(u) && u.is_applicable(context))
        .max_by(|a, b| a.version().cmp(b.version()).then_with(|| b.id().cmp(a.id())));

    match fragment {
        Some(fragment) => {
            log::debug!("Adding SWT fragment {} for {}", fragment, context);
            selected.push(Arc::clone(fragment));
            Ok(())
        }
        None => Err(P2Error::EnvironmentResolution {
            environment: context.to_string(),
            reason: format!(
                "Could not determine the {} implementation fragment for this environment",
                SWT_HOST
            ),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{Capability, Filter, Requirement};
    use tycho_version::{Version, VersionRange};

    fn swt_host() -> Arc<InstallableUnit> {
        InstallableUnit::builder(SWT_HOST, Version::new(3, 120, 0)).build()
    }

    fn fragment(id: &str, os: &str, with_code: bool) -> Arc<InstallableUnit> {
        let version = Version::new(3, 120, 0);
        let mut builder = InstallableUnit::builder(id, version.clone());
        builder.add_capability(Capability::new(namespace::OSGI_FRAGMENT, SWT_HOST, version.clone()));
        builder.add_host_requirement(Requirement::new(
            namespace::OSGI_BUNDLE,
            SWT_HOST,
            VersionRange::any(),
        ));
        if with_code {
            builder.add_capability(Capability::new(
                namespace::JAVA_PACKAGE,
                "org.eclipse.swt.internal",
                version,
            ));
        }
        builder.set_filter(Some(Filter::equal(namespace::OSGI_OS, os)));
        builder.build()
    }

    fn linux() -> SelectionContext {
        SelectionContext::new().with(namespace::OSGI_OS, "linux")
    }

    #[test]
    fn test_no_swt_is_noop() {
        let mut selected = Vec::new();
        let available = vec![fragment("org.eclipse.swt.gtk.linux", "linux", true)];
        fix_swt(&mut selected, &[], &available, &linux()).unwrap();
        assert!(selected.is_empty());
    }

    #[test]
    fn test_adds_matching_fragment() {
        let mut selected = vec![swt_host()];
        let available = vec![
            fragment("org.eclipse.swt.win32", "win32", true),
            fragment("org.eclipse.swt.nl.de", "linux", false),
            fragment("org.eclipse.swt.gtk.linux", "linux", true),
        ];
        fix_swt(&mut selected, &[], &available, &linux()).unwrap();

        assert_eq!(selected.len(), 2);
        assert_eq!(selected[1].id(), "org.eclipse.swt.gtk.linux");
    }

    #[test]
    fn test_existing_fragment_is_idempotent() {
        let gtk = fragment("org.eclipse.swt.gtk.linux", "linux", true);
        let mut selected = vec![swt_host(), gtk.clone()];
        fix_swt(&mut selected, &[], &[gtk], &linux()).unwrap();
        assert_eq!(selected.len(), 2);
    }

    #[test]
    fn test_missing_fragment_names_environment() {
        let mut selected = vec![swt_host()];
        let available = vec![fragment("org.eclipse.swt.win32", "win32", true)];
        let err = fix_swt(&mut selected, &[], &available, &linux()).unwrap_err();

        assert!(err.to_string().contains("osgi.os=linux"));
    }
}
