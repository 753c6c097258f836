//! Permission/ACL setup lines.

use mkcheck_utils::Platform;

use crate::defaults;

/// Directory creation plus ACL grants for a list of directories.
///
/// Every platform gets one `mkdir -p` line per directory. Linux
/// additionally emits eight `setfacl` lines per directory — default and
/// effective ACLs for the mask, the invoking user (resolved by the shell at
/// run time), the service UID and root, in that fixed order. The column
/// alignment inside the lines is part of the template output and is
/// reproduced exactly.
#[must_use]
pub fn permission_setup(platform: Platform, dirs: &[impl AsRef<str>]) -> Vec<String> {
    let mut commands = Vec::new();
    for dir in dirs {
        let dir = dir.as_ref();
        commands.push(format!("mkdir -p {dir}"));
        if platform == Platform::Linux {
            let uid = defaults::SERVICE_UID;
            commands.push(format!("setfacl -dRm          m:rwX  {dir}"));
            commands.push(format!("setfacl -Rm           m:rwX  {dir}"));
            commands.push(format!("setfacl -dRm u:`whoami`:rwX  {dir}"));
            commands.push(format!("setfacl -Rm  u:`whoami`:rwX  {dir}"));
            commands.push(format!("setfacl -dRm u:{uid}:rwX {dir}"));
            commands.push(format!("setfacl -Rm  u:{uid}:rwX {dir}"));
            commands.push(format!("setfacl -dRm u:root:rwX      {dir}"));
            commands.push(format!("setfacl -Rm  u:root:rwX      {dir}"));
        }
    }
    commands
}
