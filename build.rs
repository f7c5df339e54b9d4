/// Build script for render_context
///
/// # Shader Strategy:
/// - wgpu: WGSL shader embedded with `include_str!` and compiled by wgpu at runtime
fn main() {
    // Trigger rebuild if shader files change
    println!("cargo:rerun-if-changed=src/gfx/wgpu/shaders/mesh.wgsl");
}
