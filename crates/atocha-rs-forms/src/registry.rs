//! Render dispatch.
//!
//! Markup for a field is produced by a routine looked up by the pair
//! (renderer kind, field kind). A new renderer registers routines for the
//! field kinds it supports; a new field kind either registers its own
//! routines or names a `render_as` kind whose routines it can reuse. The
//! first aliased lookup memoizes the routine under the field's own kind.

use std::collections::HashMap;
use std::fmt;
use std::sync::{LazyLock, PoisonError, RwLock};

use atocha_rs_core::context::RequestContext;
use atocha_rs_core::error::{AtochaError, AtochaResult};

use crate::fields::{Field, FieldConverter, FieldKind, FieldState};
use crate::render::{display, text};
use crate::value::RenderValue;

/// Identifies a renderer backend for render dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RendererKind(&'static str);

impl RendererKind {
    /// The editable HTML renderer.
    pub const TEXT_FORM: Self = Self("text-form");
    /// The read-only HTML renderer.
    pub const TEXT_DISPLAY: Self = Self("text-display");

    /// Creates a kind for an application-defined renderer.
    pub const fn custom(name: &'static str) -> Self {
        Self(name)
    }

    /// The kind name.
    pub const fn as_str(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for RendererKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Everything a render routine needs to produce markup for one field.
#[derive(Debug, Clone, Copy)]
pub struct FieldRender<'r> {
    /// The field being rendered.
    pub field: &'r Field,
    /// The value to show, already in render form.
    pub value: &'r RenderValue,
    /// The error message to show next to the input, if any.
    pub error: Option<&'r str>,
    /// The state to render in.
    pub state: FieldState,
    /// Whether the field is required.
    pub required: bool,
    /// The request context.
    pub ctx: &'r RequestContext,
}

/// A render routine.
pub type RenderFn = fn(&FieldRender<'_>) -> AtochaResult<String>;

/// Maps (renderer kind, field kind) pairs to render routines.
///
/// The registry is shareable between threads; memoized aliases are written
/// behind a lock.
#[derive(Default)]
pub struct RenderRegistry {
    routines: RwLock<HashMap<(RendererKind, FieldKind), RenderFn>>,
}

impl fmt::Debug for RenderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let routines = self.routines.read().unwrap_or_else(PoisonError::into_inner);
        let mut pairs: Vec<String> = routines.keys().map(|(r, k)| format!("{r}/{k}")).collect();
        pairs.sort_unstable();
        f.debug_struct("RenderRegistry").field("routines", &pairs).finish()
    }
}

static DEFAULT_REGISTRY: LazyLock<RenderRegistry> = LazyLock::new(RenderRegistry::with_builtin);

/// The shared registry holding the built-in routines.
///
/// Applications may register routines for their own field kinds here.
pub fn default_registry() -> &'static RenderRegistry {
    &DEFAULT_REGISTRY
}

impl RenderRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the routines of the built-in renderers.
    pub fn with_builtin() -> Self {
        let registry = Self::new();
        for (kind, routine) in text::ROUTINES {
            registry.insert(RendererKind::TEXT_FORM, *kind, *routine);
        }
        for (kind, routine) in display::ROUTINES {
            registry.insert(RendererKind::TEXT_DISPLAY, *kind, *routine);
        }
        registry
    }

    fn insert(&self, renderer: RendererKind, field: FieldKind, routine: RenderFn) {
        self.routines
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((renderer, field), routine);
    }

    /// Registers a routine.
    ///
    /// Fails if the pair already has a routine, unless `override_existing`
    /// is set.
    pub fn register(
        &self,
        renderer: RendererKind,
        field: FieldKind,
        routine: RenderFn,
        override_existing: bool,
    ) -> AtochaResult<()> {
        let mut routines = self.routines.write().unwrap_or_else(PoisonError::into_inner);
        if !override_existing && routines.contains_key(&(renderer, field)) {
            return Err(AtochaError::DuplicateRoutine {
                renderer: renderer.to_string(),
                field: field.to_string(),
            });
        }
        routines.insert((renderer, field), routine);
        Ok(())
    }

    /// Returns `true` if a routine is registered directly for the pair.
    pub fn contains(&self, renderer: RendererKind, field: FieldKind) -> bool {
        self.routines
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&(renderer, field))
    }

    /// Finds the routine for a field, falling back to its `render_as` kind.
    pub fn lookup(
        &self,
        renderer: RendererKind,
        field: &dyn FieldConverter,
    ) -> AtochaResult<RenderFn> {
        let kind = field.kind();
        let alias = {
            let routines = self.routines.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(routine) = routines.get(&(renderer, kind)) {
                return Ok(*routine);
            }
            field
                .render_as()
                .and_then(|alias| routines.get(&(renderer, alias)).map(|r| (alias, *r)))
        };

        let Some((alias, routine)) = alias else {
            return Err(AtochaError::MissingRoutine {
                renderer: renderer.to_string(),
                field: kind.to_string(),
            });
        };
        tracing::debug!(%renderer, field = %kind, %alias, "memoizing aliased render routine");
        self.insert(renderer, kind, routine);
        Ok(routine)
    }

    /// Returns the kinds among `fields` that `renderer` cannot render.
    pub fn missing_routines(
        &self,
        renderer: RendererKind,
        fields: &[&dyn FieldConverter],
    ) -> Vec<FieldKind> {
        fields
            .iter()
            .filter(|f| self.lookup(renderer, **f).is_err())
            .map(|f| f.kind())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{
        BoolField, CheckboxesField, DateField, EmailField, FileUploadField, FloatField, IntField,
        JsDateField, ListboxField, MenuField, PasswordField, RadioField, StringField, TextAreaField,
        UrlField,
    };

    fn routine_a(_: &FieldRender<'_>) -> AtochaResult<String> {
        Ok("a".to_string())
    }

    fn routine_b(_: &FieldRender<'_>) -> AtochaResult<String> {
        Ok("b".to_string())
    }

    const R: RendererKind = RendererKind::custom("test");

    #[test]
    fn test_duplicate_registration_fails() {
        let reg = RenderRegistry::new();
        reg.register(R, FieldKind::STRING, routine_a, false).unwrap();
        let err = reg.register(R, FieldKind::STRING, routine_b, false).unwrap_err();
        assert!(matches!(err, AtochaError::DuplicateRoutine { .. }));
        reg.register(R, FieldKind::STRING, routine_b, true).unwrap();
        let routine = reg.lookup(R, &StringField::new()).unwrap();
        assert_eq!(routine as usize, routine_b as usize);
    }

    #[test]
    fn test_alias_lookup_is_memoized() {
        let reg = RenderRegistry::new();
        reg.register(R, FieldKind::STRING, routine_a, false).unwrap();
        assert!(!reg.contains(R, FieldKind::INT));
        let routine = reg.lookup(R, &IntField::new()).unwrap();
        assert_eq!(routine as usize, routine_a as usize);
        assert!(reg.contains(R, FieldKind::INT));
        // A memoized alias counts as a registration.
        assert!(reg.register(R, FieldKind::INT, routine_b, false).is_err());
    }

    #[test]
    fn test_missing_routine_names_both_kinds() {
        let reg = RenderRegistry::new();
        let err = reg.lookup(R, &IntField::new()).unwrap_err();
        match err {
            AtochaError::MissingRoutine { renderer, field } => {
                assert_eq!(renderer, "test");
                assert_eq!(field, "int");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_builtin_renderers_cover_builtin_kinds() {
        let reg = RenderRegistry::with_builtin();
        let colors = [("r", "Red")];
        let string = StringField::new();
        let textarea = TextAreaField::new();
        let password = PasswordField::new();
        let email = EmailField::new();
        let url = UrlField::new();
        let int = IntField::new();
        let float = FloatField::new();
        let boolean = BoolField::new();
        let radio = RadioField::new(colors);
        let menu = MenuField::new(colors);
        let checkboxes = CheckboxesField::new(colors);
        let listbox = ListboxField::new(colors);
        let date = DateField::new();
        let jsdate = JsDateField::new();
        let upload = FileUploadField::new();
        let all: [&dyn FieldConverter; 15] = [
            &string, &textarea, &password, &email, &url, &int, &float, &boolean, &radio, &menu,
            &checkboxes, &listbox, &date, &jsdate, &upload,
        ];
        let kinds: Vec<FieldKind> = all.iter().map(|f| f.kind()).collect();
        assert_eq!(kinds, FieldKind::BUILTIN);
        assert!(reg.missing_routines(RendererKind::TEXT_FORM, &all).is_empty());
        assert!(reg.missing_routines(RendererKind::TEXT_DISPLAY, &all).is_empty());
    }

    #[test]
    fn test_default_registry_is_shared() {
        assert!(default_registry().contains(RendererKind::TEXT_FORM, FieldKind::STRING));
        assert!(std::ptr::eq(default_registry(), default_registry()));
    }
}
