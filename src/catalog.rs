//! Default assertion catalog
//!
//! The fixed, ordered sequence of desired-state assertions that provisions a
//! network-automation workstation: system update, base CLI tooling,
//! container runtime, services, group memberships, desktop tweaks, shell
//! alias block, git identity, automation tooling, and network tools.
//!
//! Ordering is manually sequenced and must stay stable: the plan builder
//! never reorders, and later steps depend on earlier ones (a service cannot
//! be enabled before its package is installed).
//!
//! # Policy classification
//!
//! The source of each Required/Optional choice is recorded inline. The rule:
//! anything the workstation's purpose depends on is Required; hardware
//! extras and packages that only some family repos carry are Optional.

use crate::assertion::{Assertion, AssertionKind, FamilyTable, StepPolicy};
use crate::error::Result;
use crate::render::render;
use std::path::PathBuf;

/// Explicit run parameters that the source scripts read from global shell
/// state (`$USER`, `$HOME`); threaded through instead of ambient.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Target (non-root) user the workstation is provisioned for
    pub user: String,
    /// That user's home directory
    pub home: PathBuf,
    /// Git identity written into the gitconfig block
    pub git_name: String,
    pub git_email: String,
}

/// Per-family package-manager command strings for the alias block.
struct PkgCommands {
    update: &'static str,
    search: &'static str,
    install: &'static str,
    cleanup: &'static str,
}

const ARCH_CMDS: PkgCommands = PkgCommands {
    update: "sudo pacman -Syu",
    search: "pacman -Ss",
    install: "sudo pacman -S --needed",
    cleanup: "sudo pacman -Rns $(pacman -Qdtq)",
};

const DEBIAN_CMDS: PkgCommands = PkgCommands {
    update: "sudo apt-get update && sudo apt-get upgrade -y",
    search: "apt-cache search",
    install: "sudo apt-get install -y",
    cleanup: "sudo apt-get autoremove -y",
};

const REDHAT_CMDS: PkgCommands = PkgCommands {
    update: "sudo dnf upgrade -y",
    search: "dnf search",
    install: "sudo dnf install -y",
    cleanup: "sudo dnf autoremove -y",
};

const ALIAS_TEMPLATE: &str = "\
alias pkgup='{{PKG_UPDATE}}'
alias pkgsearch='{{PKG_SEARCH}}'
alias pkgin='{{PKG_INSTALL}}'
alias pkgclean='{{PKG_CLEANUP}}'
alias labssh='ssh -o StrictHostKeyChecking=accept-new'";

const GITCONFIG_TEMPLATE: &str = "\
[user]
\tname = {{GIT_NAME}}
\temail = {{GIT_EMAIL}}
[init]
\tdefaultBranch = main
[pull]
\trebase = false";

const ANSIBLE_CFG: &str = "\
[defaults]
inventory = inventory.ini
host_key_checking = False
retry_files_enabled = False
timeout = 10

[ssh_connection]
pipelining = True
";

const INVENTORY_TEMPLATE: &str = "\
# Lab inventory generated for a {{DISTRO_FAMILY}} control node
[routers]
# r1 ansible_host=192.0.2.1

[switches]
# sw1 ansible_host=192.0.2.10

[lab:children]
routers
switches

[lab:vars]
ansible_user={{USER}}
ansible_network_os=ios
";

const PLAYBOOK_TEMPLATE: &str = "\
---
- name: Gather facts from lab devices
  hosts: lab
  gather_facts: false
  tasks:
    - name: Collect device facts
      ansible.netcommon.cli_command:
        command: show version
      register: version
    - name: Show gathered output
      ansible.builtin.debug:
        var: version.stdout_lines
";

const TERRAFORM_MAIN: &str = "\
terraform {
  required_version = \">= 1.5\"
}

# Provider blocks are added per lab; this file anchors the workspace.
";

/// Render the alias block for one family's command set.
fn alias_block(cmds: &PkgCommands) -> Result<String> {
    render(
        ALIAS_TEMPLATE,
        &[
            ("PKG_UPDATE", cmds.update),
            ("PKG_SEARCH", cmds.search),
            ("PKG_INSTALL", cmds.install),
            ("PKG_CLEANUP", cmds.cleanup),
        ],
    )
}

fn pkgs(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// Build the default assertion catalog for `ctx`.
///
/// Pure construction: nothing here touches the system. Rendering happens up
/// front so an unbound template token fails the run before any mutation.
pub fn default_catalog(ctx: &RunContext) -> Result<Vec<Assertion>> {
    let aliases = FamilyTable::per_family(
        alias_block(&ARCH_CMDS)?,
        alias_block(&DEBIAN_CMDS)?,
        alias_block(&REDHAT_CMDS)?,
    );

    let gitconfig = render(
        GITCONFIG_TEMPLATE,
        &[("GIT_NAME", &ctx.git_name), ("GIT_EMAIL", &ctx.git_email)],
    )?;

    let inventory = |family: &str| -> Result<String> {
        render(
            INVENTORY_TEMPLATE,
            &[("DISTRO_FAMILY", family), ("USER", &ctx.user)],
        )
    };

    let workspace = ctx.home.join("automation");

    let catalog = vec![
        // -- update ----------------------------------------------------
        // Required: a stale package database breaks every install after it.
        Assertion::new("system update", AssertionKind::SystemUpgrade, StepPolicy::Required),
        // -- packages --------------------------------------------------
        Assertion::new(
            "base cli tooling",
            AssertionKind::PackagePresent {
                packages: FamilyTable::per_family(
                    pkgs(&["git", "curl", "wget", "vim", "tmux", "htop", "openssh"]),
                    pkgs(&["git", "curl", "wget", "vim", "tmux", "htop", "openssh-server"]),
                    pkgs(&["git", "curl", "wget", "vim-enhanced", "tmux", "htop", "openssh-server"]),
                ),
            },
            StepPolicy::Required,
        ),
        Assertion::new(
            "container runtime",
            AssertionKind::PackagePresent {
                packages: FamilyTable::per_family(
                    pkgs(&["docker", "docker-compose"]),
                    pkgs(&["docker.io", "docker-compose"]),
                    pkgs(&["moby-engine", "docker-compose"]),
                ),
            },
            StepPolicy::Required,
        ),
        // -- services --------------------------------------------------
        Assertion::new(
            "ssh daemon",
            AssertionKind::ServiceEnabled {
                service: FamilyTable::per_family(
                    "sshd".to_string(),
                    "ssh".to_string(),
                    "sshd".to_string(),
                ),
                start: true,
            },
            StepPolicy::Required,
        ),
        Assertion::new(
            "docker daemon",
            AssertionKind::ServiceEnabled {
                service: FamilyTable::uniform("docker".to_string()),
                start: true,
            },
            StepPolicy::Required,
        ),
        // -- user/groups -----------------------------------------------
        Assertion::new(
            "docker group membership",
            AssertionKind::GroupMembership {
                user: ctx.user.clone(),
                group: "docker".to_string(),
            },
            StepPolicy::Required,
        ),
        // -- desktop tweaks ----------------------------------------------
        // Optional: cosmetic, and absent on some family repos.
        Assertion::new(
            "desktop tweak tools",
            AssertionKind::PackagePresent {
                packages: FamilyTable::uniform(pkgs(&["gnome-tweaks"])),
            },
            StepPolicy::Optional,
        )
        .desktop_only(),
        // -- shell env ---------------------------------------------------
        Assertion::new(
            "shell alias block",
            AssertionKind::FileContains {
                path: ctx.home.join(".bashrc"),
                marker: "netrig managed aliases".to_string(),
                block: aliases,
            },
            StepPolicy::Required,
        ),
        // -- identity config ---------------------------------------------
        Assertion::new(
            "git identity block",
            AssertionKind::FileContains {
                path: ctx.home.join(".gitconfig"),
                marker: "netrig git identity".to_string(),
                block: FamilyTable::uniform(gitconfig),
            },
            StepPolicy::Required,
        ),
        // -- specialized hardware tweaks ----------------------------------
        // Optional best-effort, only packaged for some families.
        Assertion::new(
            "razer peripheral support",
            AssertionKind::PackagePresent {
                packages: FamilyTable {
                    arch: Some(pkgs(&["openrazer-daemon"])),
                    debian: Some(pkgs(&["openrazer-daemon"])),
                    redhat: None,
                },
            },
            StepPolicy::Optional,
        )
        .desktop_only()
        .optional_for_family(),
        // -- automation tooling -------------------------------------------
        Assertion::new(
            "ansible",
            AssertionKind::PackagePresent {
                packages: FamilyTable::uniform(pkgs(&["ansible"])),
            },
            StepPolicy::Required,
        ),
        // Optional: only the Arch repos carry these; elsewhere they come
        // from vendor downloads outside this engine's scope.
        Assertion::new(
            "terraform",
            AssertionKind::PackagePresent {
                packages: FamilyTable {
                    arch: Some(pkgs(&["terraform"])),
                    debian: None,
                    redhat: None,
                },
            },
            StepPolicy::Optional,
        )
        .optional_for_family(),
        Assertion::new(
            "terraform-docs",
            AssertionKind::PackagePresent {
                packages: FamilyTable {
                    arch: Some(pkgs(&["terraform-docs"])),
                    debian: None,
                    redhat: None,
                },
            },
            StepPolicy::Optional,
        )
        .optional_for_family(),
        Assertion::new(
            "ansible workspace config",
            AssertionKind::FileWithContent {
                path: workspace.join("ansible/ansible.cfg"),
                content: FamilyTable::uniform(ANSIBLE_CFG.to_string()),
                mode: 0o644,
            },
            StepPolicy::Required,
        ),
        Assertion::new(
            "ansible inventory",
            AssertionKind::FileWithContent {
                path: workspace.join("ansible/inventory.ini"),
                content: FamilyTable::per_family(
                    inventory("arch")?,
                    inventory("debian")?,
                    inventory("red-hat")?,
                ),
                mode: 0o644,
            },
            StepPolicy::Required,
        ),
        Assertion::new(
            "ansible playbook",
            AssertionKind::FileWithContent {
                path: workspace.join("ansible/site.yml"),
                content: FamilyTable::uniform(PLAYBOOK_TEMPLATE.to_string()),
                mode: 0o644,
            },
            StepPolicy::Required,
        ),
        Assertion::new(
            "terraform workspace",
            AssertionKind::FileWithContent {
                path: workspace.join("terraform/main.tf"),
                content: FamilyTable::uniform(TERRAFORM_MAIN.to_string()),
                mode: 0o644,
            },
            StepPolicy::Required,
        ),
        // -- network tools -------------------------------------------------
        Assertion::new(
            "network tooling",
            AssertionKind::PackagePresent {
                packages: FamilyTable::per_family(
                    pkgs(&["nmap", "tcpdump", "traceroute", "whois", "mtr", "openbsd-netcat"]),
                    pkgs(&["nmap", "tcpdump", "traceroute", "whois", "mtr", "netcat-openbsd"]),
                    pkgs(&["nmap", "tcpdump", "traceroute", "whois", "mtr", "nmap-ncat"]),
                ),
            },
            StepPolicy::Required,
        ),
    ];

    Ok(catalog)
}
