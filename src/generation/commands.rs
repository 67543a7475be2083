//! Command builders for the devtool wrapper

/// Entry point of the developer tooling
const DEVTOOL: &str = "./tools/devtool -y";
/// Archive the shared build step uploads
const SHARED_BUILD_TARBALL: &str = "build_$(uname -m).tar.gz";

/// Where test steps get pre-built binaries from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactSource {
    /// A `.tar.gz` archive holding a `build/` tree
    Tarball(String),
    /// A directory with one sub-directory of binaries per architecture
    Directory(String),
}

impl ArtifactSource {
    /// Classify a user-supplied binary location by its suffix
    pub fn from_location(location: &str) -> Self {
        if location.ends_with(".tar.gz") {
            ArtifactSource::Tarball(location.to_string())
        } else {
            ArtifactSource::Directory(location.to_string())
        }
    }
}

/// Build a `devtool test` invocation
///
/// Downloading and unpacking the binaries comes first, then the test
/// command itself: `./tools/devtool -y test [devtool_opts] -- [pytest_opts]`.
pub fn devtool_test(
    devtool_opts: Option<&str>,
    pytest_opts: Option<&str>,
    binaries: Option<&ArtifactSource>,
) -> Vec<String> {
    let mut cmds = Vec::new();
    let mut parts = vec![format!("{} test", DEVTOOL)];
    if let Some(opts) = devtool_opts {
        parts.push(opts.to_string());
    }
    parts.push("--".to_string());

    match binaries {
        Some(ArtifactSource::Tarball(tarball)) => {
            cmds.push(format!("buildkite-agent artifact download {} .", tarball));
            cmds.push(format!("tar xzf {}", tarball));
        }
        Some(ArtifactSource::Directory(dir)) => {
            cmds.push(format!(
                "buildkite-agent artifact download \"{}/$(uname -m)/*\" .",
                dir
            ));
            cmds.push(format!("chmod -v a+x {}/**/*", dir));
            parts.push(format!("--binary-dir=../{}/$(uname -m)", dir));
        }
        None => {}
    }

    if let Some(opts) = pytest_opts {
        parts.push(opts.to_string());
    }
    cmds.push(parts.join(" "));
    cmds
}

/// Commands that build the binaries once and share them with the whole build
///
/// In pull request context the base revision is built as well, under
/// `build/<revision>`, for A/B comparisons.
pub fn shared_build(base_revision: Option<&str>) -> (Vec<String>, ArtifactSource) {
    let mut cmds = vec![format!("{} build --release", DEVTOOL)];

    if let Some(rev) = base_revision {
        cmds.push(format!("git clone -b {} build/{}", rev, rev));
        cmds.push(format!(
            "cd build/{} && {} build --release && cd -",
            rev, DEVTOOL
        ));
    }

    cmds.push("du -sh build/*".to_string());
    cmds.push(format!("tar czf {} build", SHARED_BUILD_TARBALL));
    cmds.push(format!("buildkite-agent artifact upload {}", SHARED_BUILD_TARBALL));

    (cmds, ArtifactSource::Tarball(SHARED_BUILD_TARBALL.to_string()))
}
