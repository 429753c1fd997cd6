use std::fmt;

use serde::{Deserialize, Serialize};

/// The two kinds of entities that carry members
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerKind {
    Group,
    Project,
}

impl ContainerKind {
    /// Collection segment of the REST path (`groups` or `projects`)
    pub fn collection(&self) -> &'static str {
        match self {
            ContainerKind::Group => "groups",
            ContainerKind::Project => "projects",
        }
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerKind::Group => f.write_str("group"),
            ContainerKind::Project => f.write_str("project"),
        }
    }
}

/// Anything whose member list can be enumerated and pruned
pub trait Container {
    const KIND: ContainerKind;

    fn id(&self) -> u64;

    fn name(&self) -> &str;
}

/// A group as returned by `GET /groups`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: u64,
    pub name: String,
}

/// A project as returned by `GET /projects`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: u64,
    pub name: String,
}

impl Container for Group {
    const KIND: ContainerKind = ContainerKind::Group;

    fn id(&self) -> u64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Container for Project {
    const KIND: ContainerKind = ContainerKind::Project;

    fn id(&self) -> u64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_ignores_extra_fields() {
        let json = r#"{
            "id": 20,
            "name": "Core",
            "path_with_namespace": "platform/core",
            "default_branch": "main"
        }"#;
        let project: Project = serde_json::from_str(json).unwrap();
        assert_eq!(project.id(), 20);
        assert_eq!(project.name(), "Core");
        assert_eq!(Project::KIND, ContainerKind::Project);
    }

    #[test]
    fn test_kind_paths() {
        assert_eq!(ContainerKind::Group.collection(), "groups");
        assert_eq!(ContainerKind::Project.collection(), "projects");
        assert_eq!(ContainerKind::Group.to_string(), "group");
    }
}
