//! 骨架结构查看命令

use anyhow::Result;
use bert_sdk::kinematics::{Chain, LinkId};
use bert_sdk::{ForwardSolver, Target};
use clap::Args;
use std::path::PathBuf;

/// 骨架查看参数
#[derive(Args, Debug)]
pub struct ChainCommand {
    /// 骨架描述文件（TOML）
    #[arg(short, long)]
    pub skeleton: PathBuf,

    /// 只显示根到该目标的路径
    #[arg(short, long)]
    pub target: Option<Target>,
}

fn link_line(chain: &Chain, id: LinkId) -> String {
    let link = chain.link(id);
    let offset = link.end().offset;
    format!(
        "{} -> {} ({:.3}, {:.3}, {:.3})",
        link.name(),
        link.end().terminal,
        offset.x,
        offset.y,
        offset.z
    )
}

/// 以缩进树的形式展开连杆
pub fn render_tree(chain: &Chain) -> Vec<String> {
    let mut lines = vec![format!("{} ({} links)", chain.name(), chain.len())];
    let mut stack: Vec<(LinkId, usize)> = chain.roots().into_iter().rev().map(|id| (id, 1)).collect();

    while let Some((id, depth)) = stack.pop() {
        lines.push(format!("{}{}", "  ".repeat(depth), link_line(chain, id)));
        let children: Vec<LinkId> = chain
            .link_ids()
            .filter(|child| chain.link(*child).parent() == Some(id))
            .collect();
        stack.extend(children.into_iter().rev().map(|child| (child, depth + 1)));
    }
    lines
}

/// 根到目标的路径
pub fn render_path(chain: &Chain, target: Target) -> Option<Vec<String>> {
    let path = chain.partial_chain_to(target);
    if path.is_empty() {
        return None;
    }
    Some(
        path.into_iter()
            .enumerate()
            .map(|(i, id)| format!("{}. {}", i + 1, link_line(chain, id)))
            .collect(),
    )
}

impl ChainCommand {
    pub fn execute(&self) -> Result<()> {
        let solver = ForwardSolver::from_file(&self.skeleton)?;
        let chain = solver.chain();

        let lines = match self.target {
            Some(target) => render_path(chain, target)
                .ok_or_else(|| anyhow::anyhow!("{} is not part of skeleton '{}'", target, chain.name()))?,
            None => render_tree(chain),
        };
        for line in lines {
            println!("{}", line);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bert_sdk::kinematics::SkeletonDescription;
    use bert_sdk::{Appendage, Joint};

    const SKELETON: &str = r#"
name = "torso"

[[link]]
name = "pelvis"
joint = "ABS_Z"
xyz = [0.0, 0.0, 0.3]

[[link]]
name = "chest"
parent = "pelvis"
joint = "NECK_Z"
xyz = [0.0, 0.0, 0.15]

[[link]]
name = "head"
parent = "chest"
appendage = "NOSE"
xyz = [0.1, 0.0, 0.0]

[[link]]
name = "thigh"
parent = "pelvis"
joint = "LEFT_KNEE_Y"
xyz = [0.0, 0.1, -0.2]
"#;

    fn chain() -> Chain {
        Chain::from_description(&SkeletonDescription::from_toml_str(SKELETON).unwrap()).unwrap()
    }

    #[test]
    fn test_render_tree_indents_children() {
        let lines = render_tree(&chain());
        assert_eq!(lines[0], "torso (4 links)");
        assert_eq!(lines[1], "  pelvis -> ABS_Z (0.000, 0.000, 0.300)");
        assert_eq!(lines[2], "    chest -> NECK_Z (0.000, 0.000, 0.150)");
        assert_eq!(lines[3], "      head -> NOSE (0.100, 0.000, 0.000)");
        assert_eq!(lines[4], "    thigh -> LEFT_KNEE_Y (0.000, 0.100, -0.200)");
    }

    #[test]
    fn test_render_path() {
        let lines = render_path(&chain(), Appendage::Nose.into()).unwrap();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("1. pelvis"));
        assert!(lines[2].starts_with("3. head"));
        assert!(render_path(&chain(), Joint::RightKneeY.into()).is_none());
    }
}
