//! Executable plugins driven over the JSON protocol
//!
//! Each call spawns the plugin binary, writes one request line to stdin
//! and reads one response line from stdout.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;

use serde::de::DeserializeOwned;

use super::error::PluginError;
use super::protocol::{PluginManifest, PluginRequest, PluginResponse};
use super::traits::{ConversionPlugin, PathPatterns};
use crate::domain::{CustomizationItem, DiscoverResult, EmitOptions, EmitResult, ItemKind};
use crate::workspace::Workspace;

/// A plugin implemented by an external executable
#[derive(Debug, Clone)]
pub struct ExternalPlugin {
    manifest: PluginManifest,
    path: PathBuf,
}

impl ExternalPlugin {
    pub fn new(manifest: PluginManifest, path: impl Into<PathBuf>) -> Self {
        Self {
            manifest,
            path: path.into(),
        }
    }

    /// Executes a plugin request
    ///
    /// The request is written from a separate thread while stdout and stderr
    /// are drained together, so a chatty plugin cannot stall the call. A
    /// non-zero exit is an error even when a response line was printed.
    pub fn execute(&self, request: &PluginRequest) -> Result<PluginResponse, PluginError> {
        let spawn_err = |source| PluginError::Spawn {
            path: self.path.clone(),
            source,
        };

        log::debug!(
            "Running plugin '{}' operation '{}'",
            self.manifest.id,
            request.operation
        );

        let request_json = serde_json::to_string(request)
            .map_err(|e| PluginError::protocol(&self.manifest.id, e.to_string()))?;

        let mut child = Command::new(&self.path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_err)?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| PluginError::protocol(&self.manifest.id, "stdin unavailable"))?;
        let writer = thread::spawn(move || writeln!(stdin, "{}", request_json));

        let output = child.wait_with_output().map_err(spawn_err)?;

        // A plugin may exit without reading its request
        if let Ok(Err(e)) = writer.join() {
            log::debug!("Plugin '{}' did not take the request: {}", self.manifest.id, e);
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PluginError::failed(
                &self.manifest.id,
                format!("exited with {}: {}", output.status, stderr.trim()),
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let response_line = stdout
            .lines()
            .next()
            .ok_or_else(|| PluginError::protocol(&self.manifest.id, "no response"))?;

        serde_json::from_str(response_line)
            .map_err(|e| PluginError::protocol(&self.manifest.id, format!("bad response: {}", e)))
    }

    /// Executes a request and decodes its data payload
    fn call<T: DeserializeOwned>(&self, request: &PluginRequest) -> Result<T, PluginError> {
        let response = self.execute(request)?;

        if !response.success {
            return Err(PluginError::failed(
                &self.manifest.id,
                response
                    .error
                    .unwrap_or_else(|| "Unknown error".to_string()),
            ));
        }

        let data = response
            .data
            .ok_or_else(|| PluginError::protocol(&self.manifest.id, "no data returned"))?;

        serde_json::from_value(data).map_err(|e| {
            PluginError::protocol(
                &self.manifest.id,
                format!("failed to decode '{}' result: {}", request.operation, e),
            )
        })
    }
}

impl ConversionPlugin for ExternalPlugin {
    fn id(&self) -> &str {
        &self.manifest.id
    }

    fn name(&self) -> &str {
        &self.manifest.name
    }

    fn version(&self) -> Option<&str> {
        self.manifest.version.as_deref()
    }

    fn supported_kinds(&self) -> &[ItemKind] {
        &self.manifest.kinds
    }

    fn discover(&self, workspace: &dyn Workspace) -> Result<DiscoverResult, PluginError> {
        let request = PluginRequest::new(
            "discover",
            serde_json::json!({
                "root": workspace.root().display().to_string(),
            }),
        );
        self.call(&request)
    }

    fn emit(
        &self,
        items: &[CustomizationItem],
        workspace: &dyn Workspace,
        options: &EmitOptions,
    ) -> Result<EmitResult, PluginError> {
        let request = PluginRequest::new(
            "emit",
            serde_json::json!({
                "items": items,
                "root": workspace.root().display().to_string(),
                "dry_run": options.dry_run,
                "force": options.force,
            }),
        );
        self.call(&request)
    }

    fn path_patterns(&self) -> Option<PathPatterns> {
        self.manifest.path_patterns.clone()
    }
}
