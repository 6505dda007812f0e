//! Round-trip scenario from the documented contract: one structured upload
//! composed against a shared backup directory yields every install operation
//! in the required order.

use bindrop::config::{InstallationConfig, UploadSpec};
use bindrop::install;

use crate::common::{StubExecutor, target};

#[tokio::test]
async fn composed_script_contains_all_operations_in_order() {
    let executor = StubExecutor::new();
    let upload: UploadSpec =
        "path=/tmp/service_Linux_x86_64.tar.gz,dest=/usr/local/bin,owner=root,perm=0755,bindlowports=true"
            .parse()
            .expect("parse");
    let config = InstallationConfig {
        target: target(),
        uploads: vec![upload],
        backup_dir: "/bak".to_string(),
        verbose: false,
    };

    install(&config, &executor).await.expect("success");

    let scripts = executor.scripts();
    assert_eq!(scripts.len(), 1);
    let script = &scripts[0];

    let expected_in_order = [
        "mkdir -p \"/tmp/bindrop-install-",
        "tar -xzf \"/tmp/service_Linux_x86_64.tar.gz\"",
        "test -f \"/tmp/bindrop-install-",
        "mkdir -p \"/bak\"",
        "mv \"/usr/local/bin/service\" \"/bak\"/",
        "cp \"/tmp/bindrop-install-",
        "sudo chown root:root \"/usr/local/bin/service\"",
        "sudo chmod 0755 \"/usr/local/bin/service\"",
        "rm -rf \"/tmp/bindrop-install-",
        "sudo setcap 'cap_net_bind_service=+ep' \"/usr/local/bin/service\"",
    ];

    let mut cursor = 0;
    for needle in expected_in_order {
        let found = script[cursor..]
            .find(needle)
            .unwrap_or_else(|| panic!("'{needle}' missing or out of order in:\n{script}"));
        cursor += found + needle.len();
    }

    // The existence check is the integrity checkpoint: it must precede both
    // the backup move and the copy.
    let check = script.find("test -f").expect("existence check");
    assert!(check < script.find("mv \"").expect("backup move"));
    assert!(check < script.find("cp \"").expect("copy"));
}

#[tokio::test]
async fn capability_grant_absent_without_bind_low_ports() {
    let executor = StubExecutor::new();
    let upload: UploadSpec = "path=/tmp/service_Linux_x86_64.tar.gz".parse().expect("parse");
    let config = InstallationConfig {
        target: target(),
        uploads: vec![upload],
        backup_dir: "/bak".to_string(),
        verbose: false,
    };

    install(&config, &executor).await.expect("success");

    let scripts = executor.scripts();
    assert!(!scripts[0].contains("setcap"));
}
