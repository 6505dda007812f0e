//! Install script composition.
//!
//! Each upload is installed by a single shell script dispatched to the remote
//! host as one unit of work. The script is rendered from a Tera template that
//! is compiled exactly once per [`ScriptRenderer`] and shared by reference
//! across concurrent upload tasks; there is no process-wide mutable state.
//!
//! The script opens with `set -e`, so the remote shell halts at the first
//! failing operation and reports non-zero status. Step order is fixed and
//! significant:
//!
//! 1. create the temp directory (idempotent)
//! 2. extract the archive into it
//! 3. assert the expected binary is present — the integrity checkpoint that
//!    catches naming-convention mismatches or corrupt archives before any
//!    destructive step
//! 4. ensure the backup directory exists (idempotent)
//! 5. move any existing binary of the same name into the backup directory
//!    (overwriting a prior backup of that name — last backup wins)
//! 6. copy the new binary into the destination directory
//! 7. chown to the configured owner (user and group)
//! 8. chmod to the configured mode
//! 9. remove the temp directory
//! 10. only when `bind_low_ports` is set: grant `cap_net_bind_service` to the
//!     installed binary (after cleanup — it concerns the installed binary, not
//!     the temp directory)

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use tera::{Context as TeraContext, Tera};

use crate::config::UploadSpec;
use crate::core::InstallError;

const SCRIPT_TEMPLATE_NAME: &str = "install.sh";

const SCRIPT_TEMPLATE: &str = r#"set -e

# 1) Make the temporary directory
mkdir -p "{{ temp_dir }}"

# 2) Extract the tarball
tar -xzf "{{ upload_path }}" -C "{{ temp_dir }}"

# 3) Verify the new binary exists
test -f "{{ temp_dir }}/{{ binary_name }}"

# 4) Ensure backup directory exists
mkdir -p "{{ backup_dir }}"

# 5) Backup existing binary if it exists
if [ -f "{{ destination_dir }}/{{ binary_name }}" ]; then
    mv "{{ destination_dir }}/{{ binary_name }}" "{{ backup_dir }}"/
fi

# 6) Copy the new binary to destination
cp "{{ temp_dir }}/{{ binary_name }}" "{{ destination_dir }}"

# 7) Set ownership
sudo chown {{ owner }}:{{ owner }} "{{ destination_dir }}/{{ binary_name }}"

# 8) Set permissions
sudo chmod {{ permission }} "{{ destination_dir }}/{{ binary_name }}"

# 9) Remove the temporary directory
rm -rf "{{ temp_dir }}"
{%- if bind_low_ports %}

# 10) Allow the binary to bind privileged ports
sudo setcap 'cap_net_bind_service=+ep' "{{ destination_dir }}/{{ binary_name }}"
{%- endif %}
"#;

/// Values substituted into the install script template.
#[derive(Debug, Clone, Serialize)]
pub struct ScriptParams {
    /// Unique temp directory for this invocation
    pub temp_dir: String,
    /// Archive path on the remote host
    pub upload_path: String,
    /// Derived binary name
    pub binary_name: String,
    /// Shared backup directory
    pub backup_dir: String,
    /// Destination directory for the binary
    pub destination_dir: String,
    /// Owner applied as `owner:owner`
    pub owner: String,
    /// Octal mode string for chmod
    pub permission: String,
    /// Whether to append the capability grant
    pub bind_low_ports: bool,
}

impl ScriptParams {
    /// Build params for one upload, generating a fresh temp directory.
    pub fn for_upload(upload: &UploadSpec, binary_name: &str, backup_dir: &str) -> Self {
        Self {
            temp_dir: unique_temp_dir(),
            upload_path: upload.path.clone(),
            binary_name: binary_name.to_string(),
            backup_dir: backup_dir.to_string(),
            destination_dir: upload.destination_dir.clone(),
            owner: upload.owner.clone(),
            permission: upload.permission.clone(),
            bind_low_ports: upload.bind_low_ports,
        }
    }
}

/// Generate a temp directory path unique to this invocation.
///
/// Concurrent uploads each get their own temp directory, so collisions are the
/// only way two uploads could interfere; a nanosecond timestamp plus a
/// process-wide sequence number rules that out even within one tick.
fn unique_temp_dir() -> String {
    static SEQ: AtomicU64 = AtomicU64::new(0);
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let seq = SEQ.fetch_add(1, Ordering::Relaxed);
    format!("/tmp/bindrop-install-{nanos}-{seq}")
}

/// Renders install scripts from the compiled template.
///
/// Construct once per run and pass by reference into concurrent tasks; the
/// compiled template is immutable.
pub struct ScriptRenderer {
    tera: Tera,
}

impl ScriptRenderer {
    /// Compile the install script template.
    pub fn new() -> Result<Self, InstallError> {
        let mut tera = Tera::default();
        tera.add_raw_template(SCRIPT_TEMPLATE_NAME, SCRIPT_TEMPLATE).map_err(|e| {
            InstallError::TemplateError {
                reason: e.to_string(),
            }
        })?;
        Ok(Self { tera })
    }

    /// Render the full install script for one upload.
    pub fn render(&self, params: &ScriptParams) -> Result<String, InstallError> {
        let context =
            TeraContext::from_serialize(params).map_err(|e| InstallError::TemplateError {
                reason: e.to_string(),
            })?;
        self.tera.render(SCRIPT_TEMPLATE_NAME, &context).map_err(|e| {
            InstallError::TemplateError {
                reason: e.to_string(),
            }
        })
    }
}
