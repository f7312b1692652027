//! Resolution of legacy `formbuilder_form` items.
//!
//! The private feed lists a data-entry form as its own item. The map needs
//! the vector layer the form edits, so each form item is replaced by a
//! `vector_layer` item pointing at the form's parent resource, with
//! `default_form_id` pointing back at the form.
//!
//! Resolution is strict: any fetch or shape failure aborts the whole load.

use serde_json::{json, Map, Value};

use crate::client::{Credentials, NgwApi};
use crate::error::AppError;
use crate::models::fields;
use crate::models::ResourceClass;

/// Item fields copied from the form item onto its replacement.
const CARRIED_FIELDS: [&str; 5] = ["visible", "syncable", "lifetime", "min_zoom", "max_zoom"];

/// Replace every form item in `items`, descending into `layers` arrays.
///
/// Returns the number of forms resolved. `api` may be `None` when the
/// document is known to contain no forms; meeting one then is an error.
pub fn resolve_forms(
    items: &mut [Value],
    api: Option<&dyn NgwApi>,
    base: &str,
    credentials: &Credentials,
) -> Result<usize, AppError> {
    let mut resolved = 0;
    for item in items.iter_mut() {
        let Some(obj) = item.as_object_mut() else {
            continue;
        };
        let is_form = obj.get("type").and_then(Value::as_str)
            == Some(ResourceClass::FormbuilderForm.tag());
        if is_form {
            let api = api.ok_or_else(|| {
                AppError::FormResolution(
                    "project contains a form but no remote service is available".to_string(),
                )
            })?;
            *item = Value::Object(resolve_form(obj, api, base, credentials)?);
            resolved += 1;
        } else if let Some(Value::Array(children)) = obj.get_mut("layers") {
            resolved += resolve_forms(children, api, base, credentials)?;
        }
    }
    Ok(resolved)
}

fn resolve_form(
    form: &Map<String, Value>,
    api: &dyn NgwApi,
    base: &str,
    credentials: &Credentials,
) -> Result<Map<String, Value>, AppError> {
    let title = fields::string(form, "title");
    let form_id = fields::opt_int(form, "resource_id").ok_or_else(|| {
        AppError::FormResolution(format!("form {title:?} has no resource_id"))
    })?;

    let form_resource = api
        .fetch_resource(base, form_id, credentials)
        .map_err(|e| AppError::FormResolution(format!("cannot fetch form {form_id}: {e}")))?;
    let parent_id = form_resource
        .pointer("/resource/parent/id")
        .and_then(Value::as_i64)
        .ok_or_else(|| {
            AppError::FormResolution(format!("form {form_id} does not name a parent layer"))
        })?;

    let parent = api
        .fetch_resource(base, parent_id, credentials)
        .map_err(|e| {
            AppError::FormResolution(format!(
                "cannot fetch layer {parent_id} of form {form_id}: {e}"
            ))
        })?;
    let description = parent
        .pointer("/resource/description")
        .and_then(Value::as_str)
        .unwrap_or_default();

    tracing::debug!(form_id, parent_id, %title, "resolved form to its vector layer");

    let mut layer = Map::new();
    layer.insert("type".into(), json!(ResourceClass::VectorLayer.tag()));
    layer.insert("title".into(), json!(title));
    layer.insert("description".into(), json!(description));
    layer.insert("resource_id".into(), json!(parent_id));
    layer.insert("default_form_id".into(), json!(form_id));
    layer.insert("form".into(), json!(true));
    for key in CARRIED_FIELDS {
        if let Some(value) = form.get(key) {
            layer.insert(key.to_string(), value.clone());
        }
    }
    Ok(layer)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;
    use crate::client::{FetchError, ProjectRequest};

    /// In-memory [`NgwApi`] serving canned resources by id.
    #[derive(Default)]
    pub(crate) struct StubApi {
        pub project: Option<String>,
        pub resources: HashMap<i64, Value>,
        pub seen: Mutex<Vec<(i64, Credentials)>>,
    }

    impl StubApi {
        pub(crate) fn with_form(form_id: i64, parent_id: i64, description: &str) -> Self {
            let mut resources = HashMap::new();
            resources.insert(
                form_id,
                json!({ "resource": { "id": form_id, "cls": "formbuilder_form", "parent": { "id": parent_id } } }),
            );
            resources.insert(
                parent_id,
                json!({ "resource": { "id": parent_id, "cls": "vector_layer", "description": description } }),
            );
            Self {
                resources,
                ..Self::default()
            }
        }
    }

    impl NgwApi for StubApi {
        fn fetch_project(&self, request: &ProjectRequest) -> Result<String, FetchError> {
            self.project.clone().ok_or_else(|| FetchError::Status {
                url: format!("stub://project/{}", request.id),
                status: 404,
            })
        }

        fn fetch_resource(
            &self,
            _base: &str,
            id: i64,
            credentials: &Credentials,
        ) -> Result<Value, FetchError> {
            if let Ok(mut seen) = self.seen.lock() {
                seen.push((id, credentials.clone()));
            }
            self.resources.get(&id).cloned().ok_or_else(|| FetchError::Status {
                url: format!("stub://resource/{id}"),
                status: 404,
            })
        }
    }

    fn creds() -> Credentials {
        Credentials {
            login: "field".to_string(),
            password: "secret".to_string(),
        }
    }

    fn form_item() -> Value {
        json!({ "type": "formbuilder_form", "title": "F", "resource_id": 40 })
    }

    #[test]
    fn form_is_replaced_by_parent_vector_layer() {
        let api = StubApi::with_form(40, 12, "Water wells");
        let mut items = vec![json!({
            "type": "formbuilder_form",
            "title": "Wells form",
            "resource_id": 40,
            "visible": false,
            "syncable": true,
            "min_zoom": 8,
            "max_zoom": 18,
            "lifetime": 60,
            "editable": true
        })];

        let count =
            resolve_forms(&mut items, Some(&api), "https://demo", &creds()).expect("resolve");
        assert_eq!(count, 1);

        let layer = &items[0];
        assert_eq!(layer["type"], "vector_layer");
        assert_eq!(layer["resource_id"], 12);
        assert_eq!(layer["default_form_id"], 40);
        assert_eq!(layer["form"], true);
        assert_eq!(layer["title"], "Wells form");
        assert_eq!(layer["description"], "Water wells");
        assert_eq!(layer["visible"], false);
        assert_eq!(layer["syncable"], true);
        assert_eq!(layer["min_zoom"], 8);
        assert_eq!(layer["lifetime"], 60);
        assert!(layer.get("editable").is_none());

        let seen = api.seen.lock().expect("lock");
        assert_eq!(seen.iter().map(|(id, _)| *id).collect::<Vec<_>>(), vec![40, 12]);
        assert_eq!(seen[0].1, creds());
    }

    #[test]
    fn forms_inside_groups_are_resolved() {
        let api = StubApi::with_form(40, 12, "");
        let mut items = vec![json!({
            "type": "group", "title": "G",
            "layers": [ { "type": "formbuilder_form", "title": "F", "resource_id": 40 } ]
        })];
        assert_eq!(resolve_forms(&mut items, Some(&api), "", &creds()).expect("resolve"), 1);
        assert_eq!(items[0]["layers"][0]["type"], "vector_layer");
    }

    #[test]
    fn failing_parent_fetch_aborts() {
        let mut api = StubApi::with_form(40, 12, "");
        api.resources.remove(&12);
        let mut items = vec![form_item()];
        let err = resolve_forms(&mut items, Some(&api), "", &creds()).expect_err("must fail");
        match err {
            AppError::FormResolution(msg) => assert!(msg.contains("12"), "got: {msg}"),
            other => panic!("expected AppError::FormResolution, got {other:?}"),
        }
    }

    #[test]
    fn form_without_parent_aborts() {
        let mut api = StubApi::default();
        api.resources.insert(40, json!({ "resource": { "id": 40 } }));
        let mut items = vec![form_item()];
        assert!(matches!(
            resolve_forms(&mut items, Some(&api), "", &creds()),
            Err(AppError::FormResolution(_))
        ));
    }

    #[test]
    fn form_without_api_aborts() {
        let mut items = vec![form_item()];
        assert!(matches!(
            resolve_forms(&mut items, None, "", &creds()),
            Err(AppError::FormResolution(_))
        ));
    }

    #[test]
    fn documents_without_forms_need_no_api() {
        let mut items = vec![json!({ "type": "tms", "title": "OSM" })];
        assert_eq!(resolve_forms(&mut items, None, "", &creds()).expect("resolve"), 0);
    }
}
