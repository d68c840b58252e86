use anyhow::Result;
use log::info;

use crate::registry::RegistryStore;
use crate::runtime::Runtime;

use super::config::Config;

/// Delete the global state directory and everything in it.
///
/// Links already created in projects are left in place.
#[tracing::instrument(skip(runtime, config))]
pub fn purge<R: Runtime>(runtime: R, yes: bool, config: Config) -> Result<()> {
    let store = RegistryStore::new(&runtime, config.state_dir.clone());

    if !runtime.exists(store.state_dir()) {
        println!("Nothing to remove at {}", store.state_dir().display());
        return Ok(());
    }

    if !yes {
        let prompt = format!(
            "Remove all link registry data in {}?",
            store.state_dir().display()
        );
        if !runtime.confirm(&prompt)? {
            info!("Purge cancelled by user");
            println!("Aborted.");
            return Ok(());
        }
    }

    store.remove_all()?;
    println!("Removed {}", store.state_dir().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use crate::test_utils::{test_home, test_state_dir};
    use mockall::predicate::eq;

    fn config() -> Config {
        Config::for_test(test_state_dir(), test_home().join("app"))
    }

    #[test]
    fn test_purge_confirmed() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_exists()
            .with(eq(test_state_dir()))
            .returning(|_| true);
        runtime.expect_confirm().times(1).returning(|_| Ok(true));
        runtime
            .expect_remove_dir_all()
            .with(eq(test_state_dir()))
            .times(1)
            .returning(|_| Ok(()));

        purge(runtime, false, config()).unwrap();
    }

    #[test]
    fn test_purge_declined_keeps_data() {
        let mut runtime = MockRuntime::new();
        runtime.expect_exists().returning(|_| true);
        runtime.expect_confirm().times(1).returning(|_| Ok(false));
        runtime.expect_remove_dir_all().never();

        purge(runtime, false, config()).unwrap();
    }

    #[test]
    fn test_purge_yes_skips_prompt() {
        let mut runtime = MockRuntime::new();
        runtime.expect_exists().returning(|_| true);
        runtime.expect_confirm().never();
        runtime
            .expect_remove_dir_all()
            .times(1)
            .returning(|_| Ok(()));

        purge(runtime, true, config()).unwrap();
    }

    #[test]
    fn test_purge_nothing_to_remove() {
        let mut runtime = MockRuntime::new();
        runtime.expect_exists().returning(|_| false);
        runtime.expect_confirm().never();

        purge(runtime, false, config()).unwrap();
    }
}
