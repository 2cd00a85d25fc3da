//! Types for use when configuring newsspool modules.

use crate::*;

/// helper transcode function
fn tc<S: serde::Serialize, D: serde::de::DeserializeOwned>(
    s: &S,
) -> NsResult<D> {
    serde_json::from_str(
        &serde_json::to_string(s)
            .map_err(|e| NsError::other_src("encode", e))?,
    )
    .map_err(|e| NsError::other_src("decode", e))
}

/// Denotes a type used to configure a specific newsspool module.
///
/// Note, the types defined in this struct are specifically for
/// configuration that cannot be changed at runtime, the likes of which
/// might be found in a configuration file.
///
/// It is highly recommended that you expose this struct in your module
/// docs to help devs using your module understand how to configure it.
pub trait ModConfig:
    'static
    + Sized
    + Default
    + std::fmt::Debug
    + serde::Serialize
    + serde::de::DeserializeOwned
    + Send
    + Sync
{
}

/// Newsspool configuration.
#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct Config(serde_json::Map<String, serde_json::Value>);

impl Config {
    /// When newsspool is generating a default or example configuration
    /// file, it will pass a mutable reference of this config struct to
    /// the module factories that are configured to be used. Those
    /// factories should call this function any number of times to add any
    /// default configuration parameters to that file.
    pub fn add_default_module_config<M: ModConfig>(
        &mut self,
        module_name: String,
    ) -> NsResult<()> {
        if self.0.contains_key(&module_name) {
            return Err(NsError::other(format!(
                "Refusing to overwrite conflicting module name: {module_name}"
            )));
        }
        self.0.insert(module_name, tc(&M::default())?);
        Ok(())
    }

    /// When newsspool is initializing, it will call the factory function
    /// for all of its modules with an immutable reference to this config
    /// struct. Each of those modules may choose to call this function
    /// to extract a module config. Note that this config is loaded from
    /// disk and can be edited by humans, so the serialization on the
    /// module config should be tolerant to missing properties, setting
    /// sane defaults.
    pub fn get_module_config<M: ModConfig>(
        &self,
        module_name: &str,
    ) -> NsResult<M> {
        self.0
            .get(module_name)
            .map(tc)
            .unwrap_or_else(|| Ok(M::default()))
    }

    /// Replace a module config wholesale. Mostly useful in tests.
    pub fn set_module_config<M: ModConfig>(
        &mut self,
        module_name: String,
        module: &M,
    ) -> NsResult<()> {
        self.0.insert(module_name, tc(module)?);
        Ok(())
    }
}

/// The master configuration of the assembled spool: where the spool root
/// lives and which registered backend serves each store.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpoolConfig {
    /// The spool root directory.
    pub spool: String,

    /// Registry name of the overview store backend.
    pub ov_method: String,

    /// Registry name of the history store backend.
    pub his_method: String,

    /// Registry name of the reverse index backend.
    pub ri_method: String,

    /// Registry name of the group catalog backend.
    pub group_method: String,

    /// Directory holding the `active` and `newsgroups` catalog files.
    pub config_path: String,

    /// File extension of the catalog files ("", "gz", "bz2", ...). The
    /// matching decoder must be registered with the decompression
    /// registry.
    pub decompress: String,

    /// Default article retention in seconds. Zero disables automatic
    /// expiry for articles without an explicit expiry time.
    pub default_expiry_s: u64,
}

impl SpoolConfig {
    /// The module name this config is registered under.
    pub const MODULE: &'static str = "spool";

    /// The default retention as a [std::time::Duration], if any.
    pub fn default_expiry(&self) -> Option<std::time::Duration> {
        if self.default_expiry_s == 0 {
            None
        } else {
            Some(std::time::Duration::from_secs(self.default_expiry_s))
        }
    }
}

impl Default for SpoolConfig {
    fn default() -> Self {
        Self {
            spool: "./spool".into(),
            ov_method: "ovldb".into(),
            his_method: "hisldb".into(),
            ri_method: "rildb".into(),
            group_method: "tradgroup".into(),
            config_path: "./config".into(),
            decompress: "".into(),
            default_expiry_s: 60 * 60 * 24,
        }
    }
}

impl ModConfig for SpoolConfig {}

/// The policy binding one storage class to a storage method.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StorageClassConfig {
    /// Registry name of the storage method serving this class.
    pub method: String,

    /// The class index, 0..=255.
    pub class: u8,

    /// Wildmat over newsgroup names. Empty matches everything.
    pub newsgroups: String,

    /// Smallest article size this class accepts.
    pub size: i64,

    /// Largest article size this class accepts. Zero is unbounded.
    pub max_size: i64,

    /// With a newsgroups pattern: require every group to match, instead
    /// of any.
    pub exact_match: bool,
}

impl Default for StorageClassConfig {
    fn default() -> Self {
        Self {
            method: "timehash".into(),
            class: 0,
            newsgroups: "".into(),
            size: 0,
            max_size: 0,
            exact_match: false,
        }
    }
}

/// The set of configured storage classes.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StorageClassesConfig {
    /// One entry per bound class. Entries with duplicate class indexes
    /// resolve last-wins.
    pub classes: Vec<StorageClassConfig>,
}

impl StorageClassesConfig {
    /// The module name this config is registered under.
    pub const MODULE: &'static str = "storageClasses";
}

impl ModConfig for StorageClassesConfig {}
