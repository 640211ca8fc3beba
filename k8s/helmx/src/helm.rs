/// Contains the HelmClient. Used for running helm commands.
pub mod client;

/// Contains the `helm upgrade` command builder.
pub mod upgrade;
