//! Shared helpers for unit tests

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use crate::graphics_device::{ShaderStage, ShaderStageSource, SharedDevice};
use crate::resource::Shader;

static NEXT_DIR: AtomicUsize = AtomicUsize::new(0);

/// Fresh, empty directory under the system temp dir
pub fn temp_dir(label: &str) -> PathBuf {
    let id = NEXT_DIR.fetch_add(1, Ordering::SeqCst);
    let dir = std::env::temp_dir().join(format!("lumen3d_{}_{}_{}", label, std::process::id(), id));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

/// Vertex + fragment sources declaring the given uniforms
pub fn stages_with_uniforms(uniforms: &[&str]) -> Vec<ShaderStageSource> {
    let declarations: String = uniforms
        .iter()
        .map(|name| format!("uniform mat4 {};\n", name))
        .collect();
    vec![
        ShaderStageSource {
            stage: ShaderStage::Vertex,
            source: format!("{}void main() {{}}\n", declarations),
        },
        ShaderStageSource {
            stage: ShaderStage::Fragment,
            source: "void main() {}\n".to_string(),
        },
    ]
}

/// Embedded shader declaring the full draw + material uniform set
pub fn full_shader(device: &SharedDevice, name: &str) -> Shader {
    Shader::from_sources(
        device,
        name,
        stages_with_uniforms(&[
            "MatrWVP", "MatrW", "Time", "CamLoc", "CamDir", "Ka", "Kd", "Ks", "Ph", "Trans", "IsTexture",
        ]),
    )
    .unwrap()
}

/// Write `<dir>/<name>vert.glsl` and `<dir>/<name>frag.glsl`, return the prefix
pub fn write_shader_files(dir: &PathBuf, name: &str, vert: &str, frag: &str) -> String {
    let prefix = format!("{}/{}", dir.display(), name);
    fs::write(format!("{}vert.glsl", prefix), vert).unwrap();
    fs::write(format!("{}frag.glsl", prefix), frag).unwrap();
    prefix
}
