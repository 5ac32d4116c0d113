//! Well-known namespaces, classifiers and property keys.

/// Installable unit identity
pub const IU: &str = "org.eclipse.equinox.p2.iu";
pub const OSGI_BUNDLE: &str = "osgi.bundle";
pub const JAVA_PACKAGE: &str = "java.package";
pub const OSGI_FRAGMENT: &str = "osgi.fragment";
pub const OSGI_EE: &str = "osgi.ee";
pub const ECLIPSE_TYPE: &str = "org.eclipse.equinox.p2.eclipse.type";
pub const LOCALIZATION: &str = "org.eclipse.equinox.p2.localization";
pub const FLAVOR: &str = "org.eclipse.equinox.p2.flavor";

pub const TYPE_BUNDLE: &str = "bundle";
pub const TYPE_SOURCE: &str = "source";
pub const TYPE_FEATURE: &str = "feature";

/// Artifact classifiers
pub const CLASSIFIER_BUNDLE: &str = "osgi.bundle";
pub const CLASSIFIER_FEATURE: &str = "org.eclipse.update.feature";
pub const CLASSIFIER_BINARY: &str = "binary";

pub const PROP_NAME: &str = "org.eclipse.equinox.p2.name";
pub const PROP_PROVIDER: &str = "org.eclipse.equinox.p2.provider";
pub const PROP_DESCRIPTION: &str = "org.eclipse.equinox.p2.description";
pub const PROP_BUNDLE_LOCALIZATION: &str = "org.eclipse.equinox.p2.bundle.localization";
pub const PROP_TYPE_GROUP: &str = "org.eclipse.equinox.p2.type.group";
pub const PROP_TYPE_PRODUCT: &str = "org.eclipse.equinox.p2.type.product";
pub const PROP_ROOT_FEATURES: &str = "org.eclipse.tycho.product.root.features";

/// Selection context properties gating optional content
pub const INSTALL_SOURCES: &str = "org.eclipse.update.install.sources";
pub const INSTALL_FEATURES: &str = "org.eclipse.update.install.features";

pub const OSGI_OS: &str = "osgi.os";
pub const OSGI_WS: &str = "osgi.ws";
pub const OSGI_ARCH: &str = "osgi.arch";
pub const OSGI_NL: &str = "osgi.nl";
