//! Azure cloud environments and their endpoint maps.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Logical endpoint kinds an environment knows about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    Management,
    ResourceManager,
    Graph,
    KeyVault,
    DataLakeStore,
    DataLakeAnalytics,
    LogAnalytics,
    ApplicationInsights,
}

impl Endpoint {
    pub fn identifier(&self) -> &'static str {
        match self {
            Endpoint::Management => "managementEndpointUrl",
            Endpoint::ResourceManager => "resourceManagerEndpointUrl",
            Endpoint::Graph => "activeDirectoryGraphResourceId",
            Endpoint::KeyVault => "keyVaultDnsSuffix",
            Endpoint::DataLakeStore => "azureDataLakeStoreFileSystemEndpointSuffix",
            Endpoint::DataLakeAnalytics => "azureDataLakeAnalyticsCatalogAndJobEndpointSuffix",
            Endpoint::LogAnalytics => "azureLogAnalyticsResourceId",
            Endpoint::ApplicationInsights => "azureApplicationInsightsResourceId",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

/// A named Azure cloud: its endpoint suffixes and OAuth resource IDs.
///
/// Endpoints are kept in insertion order. Audience resolution walks them in
/// that order, so two environments with the same entries in a different
/// order may resolve overlapping hosts differently.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AzureEnvironment {
    name: String,
    endpoints: Vec<(Endpoint, String)>,
    active_directory_endpoint: String,
    management_endpoint: String,
    graph_endpoint: String,
    data_lake_resource_id: Option<String>,
    log_analytics_resource_id: Option<String>,
    application_insights_resource_id: Option<String>,
}

impl AzureEnvironment {
    pub const AZURE: &'static str = "AzureCloud";
    pub const AZURE_CHINA: &'static str = "AzureChinaCloud";
    pub const AZURE_US_GOVERNMENT: &'static str = "AzureUSGovernment";
    pub const AZURE_GERMANY: &'static str = "AzureGermanCloud";

    pub fn builder(name: impl Into<String>) -> AzureEnvironmentBuilder {
        AzureEnvironmentBuilder::new(name)
    }

    /// Azure public cloud.
    pub fn azure() -> Self {
        Self::builder(Self::AZURE)
            .active_directory_endpoint("https://login.microsoftonline.com/")
            .management_endpoint("https://management.core.windows.net/")
            .endpoint(Endpoint::ResourceManager, "https://management.azure.com/")
            .graph_endpoint("https://graph.windows.net/")
            .endpoint(Endpoint::KeyVault, ".vault.azure.net")
            .endpoint(Endpoint::DataLakeStore, "azuredatalakestore.net")
            .endpoint(Endpoint::DataLakeAnalytics, "azuredatalakeanalytics.net")
            .data_lake_resource_id("https://datalake.azure.net/")
            .log_analytics("https://api.loganalytics.io/")
            .application_insights("https://api.applicationinsights.io/")
            .build()
    }

    /// Azure China cloud.
    pub fn azure_china() -> Self {
        Self::builder(Self::AZURE_CHINA)
            .active_directory_endpoint("https://login.chinacloudapi.cn/")
            .management_endpoint("https://management.core.chinacloudapi.cn/")
            .endpoint(Endpoint::ResourceManager, "https://management.chinacloudapi.cn/")
            .graph_endpoint("https://graph.chinacloudapi.cn/")
            .endpoint(Endpoint::KeyVault, ".vault.azure.cn")
            .build()
    }

    /// Azure US Government cloud.
    pub fn azure_us_government() -> Self {
        Self::builder(Self::AZURE_US_GOVERNMENT)
            .active_directory_endpoint("https://login.microsoftonline.us/")
            .management_endpoint("https://management.core.usgovcloudapi.net/")
            .endpoint(Endpoint::ResourceManager, "https://management.usgovcloudapi.net/")
            .graph_endpoint("https://graph.windows.net/")
            .endpoint(Endpoint::KeyVault, ".vault.usgovcloudapi.net")
            .build()
    }

    /// Azure German cloud.
    pub fn azure_germany() -> Self {
        Self::builder(Self::AZURE_GERMANY)
            .active_directory_endpoint("https://login.microsoftonline.de/")
            .management_endpoint("https://management.core.cloudapi.de/")
            .endpoint(Endpoint::ResourceManager, "https://management.microsoftazure.de/")
            .graph_endpoint("https://graph.cloudapi.de/")
            .endpoint(Endpoint::KeyVault, ".vault.microsoftazure.de")
            .build()
    }

    /// Look up a preset by its well-known name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        [
            Self::azure(),
            Self::azure_china(),
            Self::azure_us_government(),
            Self::azure_germany(),
        ]
        .into_iter()
        .find(|env| env.name.eq_ignore_ascii_case(name))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Endpoint entries in resolution order.
    pub fn endpoints(&self) -> impl Iterator<Item = (Endpoint, &str)> {
        self.endpoints.iter().map(|(kind, value)| (*kind, value.as_str()))
    }

    pub fn endpoint(&self, kind: Endpoint) -> Option<&str> {
        self.endpoints
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, value)| value.as_str())
    }

    /// Authority host used for token requests.
    pub fn active_directory_endpoint(&self) -> &str {
        &self.active_directory_endpoint
    }

    /// ARM resource ID; the audience when no endpoint matches.
    pub fn management_endpoint(&self) -> &str {
        &self.management_endpoint
    }

    pub fn graph_endpoint(&self) -> &str {
        &self.graph_endpoint
    }

    pub fn data_lake_resource_id(&self) -> Option<&str> {
        self.data_lake_resource_id.as_deref()
    }

    pub fn log_analytics_resource_id(&self) -> Option<&str> {
        self.log_analytics_resource_id.as_deref()
    }

    pub fn application_insights_resource_id(&self) -> Option<&str> {
        self.application_insights_resource_id.as_deref()
    }
}

impl Default for AzureEnvironment {
    fn default() -> Self {
        Self::azure()
    }
}

impl fmt::Display for AzureEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Builder for custom environments (private clouds, test fixtures).
#[derive(Clone, Debug)]
pub struct AzureEnvironmentBuilder {
    env: AzureEnvironment,
}

impl AzureEnvironmentBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            env: AzureEnvironment {
                name: name.into(),
                endpoints: Vec::new(),
                active_directory_endpoint: String::new(),
                management_endpoint: String::new(),
                graph_endpoint: String::new(),
                data_lake_resource_id: None,
                log_analytics_resource_id: None,
                application_insights_resource_id: None,
            },
        }
    }

    /// Set an endpoint entry. Re-setting a kind keeps its original position.
    pub fn endpoint(mut self, kind: Endpoint, value: impl Into<String>) -> Self {
        let value = value.into();
        match self.env.endpoints.iter_mut().find(|(k, _)| *k == kind) {
            Some(entry) => entry.1 = value,
            None => self.env.endpoints.push((kind, value)),
        }
        self
    }

    pub fn active_directory_endpoint(mut self, url: impl Into<String>) -> Self {
        self.env.active_directory_endpoint = url.into();
        self
    }

    /// Set the ARM resource ID and register it as the `Management` endpoint.
    pub fn management_endpoint(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.env.management_endpoint = url.clone();
        self.endpoint(Endpoint::Management, url)
    }

    /// Set the Graph resource ID and register it as the `Graph` endpoint.
    pub fn graph_endpoint(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.env.graph_endpoint = url.clone();
        self.endpoint(Endpoint::Graph, url)
    }

    pub fn data_lake_resource_id(mut self, id: impl Into<String>) -> Self {
        self.env.data_lake_resource_id = Some(id.into());
        self
    }

    pub fn log_analytics(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.env.log_analytics_resource_id = Some(url.clone());
        self.endpoint(Endpoint::LogAnalytics, url)
    }

    pub fn application_insights(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.env.application_insights_resource_id = Some(url.clone());
        self.endpoint(Endpoint::ApplicationInsights, url)
    }

    pub fn build(self) -> AzureEnvironment {
        self.env
    }
}
