use serde_json::Value;

/// Merge a JSON patch into a base value.
///
/// For each key in `patch`:
/// - If the value is `null`, the key is removed from `base`.
/// - If the value is an object, it is merged recursively.
/// - Otherwise, the key is set to the patch value. Arrays are replaced
///   wholesale, never merged element-wise.
///
/// This follows RFC 7386 (JSON Merge Patch) semantics and backs the
/// `update` / `merge_create` operations of every [`crate::DocStore`]
/// implementation.
pub fn merge_patch(base: &mut Value, patch: &Value) {
    if let (Some(base_obj), Some(patch_obj)) = (base.as_object_mut(), patch.as_object()) {
        for (key, value) in patch_obj {
            if value.is_null() {
                base_obj.remove(key);
            } else if value.is_object() {
                // Recursively merge nested objects.
                let entry = base_obj
                    .entry(key.clone())
                    .or_insert_with(|| Value::Object(serde_json::Map::new()));
                merge_patch(entry, value);
            } else {
                base_obj.insert(key.clone(), value.clone());
            }
        }
    } else {
        *base = patch.clone();
    }
}
