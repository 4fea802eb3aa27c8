//! RPC method handler for the RedBlue JSON-RPC protocol.
//!
//! Extracted from `rpc_server.rs` so it can be unit-tested independently.
//! `handle_method` dispatches method calls to the store, the identity
//! provider and the export service held by [`App`].

use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use serde_json::{json, Value};

use crate::app::App;
use crate::managers::credential_store::{CredentialStore, CredentialStoreTrait};
use crate::services::export_service::ExportServiceTrait;
use crate::services::password_strength::{get_strength, strength_score};
use crate::types::credential::{CredentialPatch, NewCredential, RecordStatus};
use crate::types::snapshot::ThemeMode;

fn lock(app: &Mutex<App>) -> Result<MutexGuard<'_, App>, String> {
    app.lock().map_err(|e| e.to_string())
}

fn str_param<'a>(params: &'a Value, name: &str) -> Result<&'a str, String> {
    params
        .get(name)
        .and_then(|v| v.as_str())
        .ok_or_else(|| format!("missing {}", name))
}

fn status_param(params: &Value, name: &str) -> Result<RecordStatus, String> {
    let raw = str_param(params, name)?;
    RecordStatus::parse(raw).ok_or_else(|| format!("invalid status: {}", raw))
}

fn signed_in(a: &mut App) -> Result<&mut CredentialStore, String> {
    a.store_mut().ok_or_else(|| "not signed in".to_string())
}

fn settings_json(store: &CredentialStore) -> Value {
    json!({
        "autoBackupEnabled": store.auto_backup_enabled(),
        "themeMode": store.theme_mode().as_str(),
    })
}

/// Dispatch a JSON-RPC method call to the appropriate handler.
///
/// Returns `Ok(Value)` on success or `Err(String)` with an error message.
/// Methods touching the store fail with `not signed in` while no session is
/// active.
pub async fn handle_method(
    app: &Mutex<App>,
    method: &str,
    params: &Value,
) -> Result<Value, String> {
    match method {
        "ping" => Ok(json!({"pong": true})),

        // ─── Auth ───
        "auth.signIn" => {
            let email = str_param(params, "email")?;
            let password = str_param(params, "password")?;
            let identity = lock(app)?.identity.clone();
            let session = identity.sign_in(email, password).await.map_err(|e| e.to_string())?;
            Ok(json!({"user": session.user}))
        }
        "auth.signUp" => {
            let email = str_param(params, "email")?;
            let password = str_param(params, "password")?;
            let identity = lock(app)?.identity.clone();
            identity.sign_up(email, password).await.map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "auth.signOut" => {
            let identity = lock(app)?.identity.clone();
            identity.sign_out().await;
            lock(app)?.store.flush();
            Ok(json!({"ok": true}))
        }
        "auth.session" => {
            let a = lock(app)?;
            Ok(json!({"user": a.current_session().map(|s| s.user)}))
        }

        // ─── Strength ───
        "strength.check" => {
            let password = params.get("password").and_then(|v| v.as_str()).unwrap_or("");
            let strength = get_strength(password);
            Ok(json!({
                "score": strength_score(password),
                "label": strength.label(),
                "color": strength.color(),
            }))
        }

        // ─── Credentials ───
        "credential.add" => {
            let fields: NewCredential = serde_json::from_value(params.clone())
                .map_err(|e| format!("invalid params: {}", e))?;
            let mut a = lock(app)?;
            let record = signed_in(&mut a)?.add(fields).map_err(|e| e.to_string())?;
            Ok(json!(record))
        }
        "credential.get" => {
            let id = str_param(params, "id")?;
            let mut a = lock(app)?;
            let store = signed_in(&mut a)?;
            let record = store.get(id).ok_or_else(|| format!("Credential not found: {}", id))?;
            Ok(json!(record))
        }
        "credential.update" => {
            let id = str_param(params, "id")?;
            let patch: CredentialPatch = match params.get("patch") {
                Some(p) => serde_json::from_value(p.clone())
                    .map_err(|e| format!("invalid patch: {}", e))?,
                None => return Err("missing patch".to_string()),
            };
            let mut a = lock(app)?;
            signed_in(&mut a)?.update(id, patch).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "credential.move" => {
            let id = str_param(params, "id")?;
            let status = status_param(params, "status")?;
            let mut a = lock(app)?;
            signed_in(&mut a)?.move_to(id, status).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "credential.delete" => {
            let id = str_param(params, "id")?;
            let mut a = lock(app)?;
            signed_in(&mut a)?.delete(id).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "credential.list" => {
            let status = match params.get("status") {
                Some(_) => status_param(params, "status")?,
                None => RecordStatus::Active,
            };
            let query = params.get("query").and_then(|v| v.as_str()).unwrap_or("");
            let mut a = lock(app)?;
            let store = signed_in(&mut a)?;
            let items: Vec<Value> = store.filtered_view(status, query).map(|r| json!(r)).collect();
            Ok(json!({"items": items}))
        }

        // ─── Labels ───
        "label.add" => {
            let name = str_param(params, "name")?;
            let mut a = lock(app)?;
            let store = signed_in(&mut a)?;
            let added = store.add_label(name).map_err(|e| e.to_string())?;
            Ok(json!({"added": added, "labels": store.labels()}))
        }
        "label.list" => {
            let mut a = lock(app)?;
            let store = signed_in(&mut a)?;
            Ok(json!({"labels": store.labels()}))
        }

        // ─── Settings ───
        "settings.get" => {
            let mut a = lock(app)?;
            let last_fault = a.last_fault().map(|f| f.to_string());
            let mut settings = settings_json(signed_in(&mut a)?);
            settings["lastPersistenceFault"] = json!(last_fault);
            Ok(settings)
        }
        "settings.autoBackup" => {
            let enabled = params
                .get("enabled")
                .and_then(|v| v.as_bool())
                .ok_or("missing enabled")?;
            let mut a = lock(app)?;
            let store = signed_in(&mut a)?;
            store.set_auto_backup(enabled);
            Ok(settings_json(store))
        }
        "settings.theme" => {
            let raw = str_param(params, "mode")?;
            let mode = ThemeMode::parse(raw).ok_or_else(|| format!("invalid theme mode: {}", raw))?;
            let mut a = lock(app)?;
            let store = signed_in(&mut a)?;
            store.set_theme_mode(mode);
            Ok(settings_json(store))
        }

        // ─── Backup / Export ───
        "backup.share" => {
            let mut a = lock(app)?;
            signed_in(&mut a)?;
            let path = a.share_database().map_err(|e| e.to_string())?;
            Ok(json!({"path": path}))
        }
        "backup.restore" => {
            let path = PathBuf::from(str_param(params, "path")?);
            let mut a = lock(app)?;
            signed_in(&mut a)?;
            let blob = a.export.read_backup(&path).map_err(|e| e.to_string())?;
            let store = signed_in(&mut a)?;
            store.restore_from_backup(&blob).map_err(|e| e.to_string())?;
            Ok(json!({"records": store.records().len()}))
        }
        "record.export" => {
            let id = str_param(params, "id")?;
            let mut a = lock(app)?;
            signed_in(&mut a)?;
            match a.export_record(id).map_err(|e| e.to_string())? {
                Some(path) => Ok(json!({"path": path})),
                None => Err(format!("Credential not found: {}", id)),
            }
        }
        "history.clear" => {
            let mut a = lock(app)?;
            signed_in(&mut a)?.clear_search_history();
            Ok(json!({"ok": true}))
        }

        _ => Err(format!("unknown method: {}", method)),
    }
}
