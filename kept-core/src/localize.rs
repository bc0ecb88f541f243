use fluent_bundle::{FluentArgs, FluentBundle, FluentResource, FluentValue};
use unic_langid::LanguageIdentifier;

/// Fluent localizer for user-facing run summaries.
pub struct FluentLoc {
    bundle: FluentBundle<FluentResource>,
}

impl FluentLoc {
    /// Localizer over the `.ftl` resources compiled into the crate (see ../i18n).
    /// Every language currently falls back to en-GB.
    pub fn builtin(lang: &str) -> Self {
        let langid: LanguageIdentifier = lang.parse().unwrap_or_default();

        let ftl_src = include_str!("../i18n/en-GB.ftl");

        // A resource with syntax errors still carries every entry that parsed.
        let res = FluentResource::try_new(ftl_src.to_owned()).unwrap_or_else(|(res, errs)| {
            tracing::warn!(?errs, "built-in FTL resource has errors");
            res
        });

        let mut bundle = FluentBundle::new(vec![langid]);
        // Plain terminal output: no Unicode isolation marks around arguments.
        bundle.set_use_isolating(false);
        if let Err(errs) = bundle.add_resource(res) {
            tracing::warn!(?errs, "failed to add FTL resource");
        }
        Self { bundle }
    }

    /// Render message `code` with named string arguments.
    /// Unknown codes and formatting errors render as the code itself.
    pub fn msg(&self, code: &str, args: &[(&str, &str)]) -> String {
        let Some(pattern) = self.bundle.get_message(code).and_then(|m| m.value()) else {
            return code.to_string();
        };
        let mut fargs = FluentArgs::new();
        for &(name, value) in args {
            fargs.set(name, FluentValue::from(value));
        }
        let mut errs = Vec::new();
        let out = self.bundle.format_pattern(pattern, Some(&fargs), &mut errs);
        if errs.is_empty() {
            out.into_owned()
        } else {
            code.to_string()
        }
    }
}

impl Default for FluentLoc {
    fn default() -> Self {
        Self::builtin("en-GB")
    }
}
