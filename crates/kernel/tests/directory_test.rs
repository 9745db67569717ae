//! End-to-end composition over the sample remotes shipped in `remotes/`.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::path::PathBuf;

use navshell_kernel::remote::LoaderKind;
use navshell_kernel::{AppState, Collaborators, Config};

use common::{StubGateway, admin, eventually, settled};

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..")
}

#[tokio::test]
async fn sample_remotes_compose() {
    let root = workspace_root();
    let config = Config {
        remote_loader: LoaderKind::Directory,
        remote_dir: root.join("remotes"),
        nav_file: root.join("config/navigation.toml"),
        i18n_dir: root.join("config/i18n"),
        ..Config::default()
    };

    let gateway = StubGateway::new();
    let collaborators = Collaborators {
        loader: navshell_kernel::remote::build_loader(&config).unwrap(),
        gateway: gateway.clone(),
        profile: gateway,
    };
    let state = AppState::with_collaborators(&config, collaborators)
        .await
        .unwrap();

    state.session().mark_ready(admin());
    assert!(state.aggregator().activate());
    let model = settled(state.aggregator()).await;
    assert_eq!(
        model.names(),
        vec!["Home", "Administration", "Gateway", "Products", "Orders", "Invoices"]
    );

    let translations = state.translations();
    eventually(|| translations.installed_sources().len() == 2).await;
    translations.use_locale("fr").unwrap();
    assert_eq!(translations.translate("global.menu.entities.mfront2Invoice"), "Factures");
    assert_eq!(translations.translate("global.menu.admin.gateway"), "Passerelle");
}
