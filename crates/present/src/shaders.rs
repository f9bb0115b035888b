/// WGSL shader that samples the framebuffer texture over a fullscreen
/// triangle. The render pass viewport does the letterboxing.
pub const BLIT_SHADER: &str = r#"
@group(0) @binding(0)
var frame_tex: texture_2d<f32>;
@group(0) @binding(1)
var frame_sampler: sampler;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_blit(@builtin(vertex_index) index: u32) -> VertexOutput {
    // Oversized triangle covering clip space; uv (0,0) is the top-left pixel.
    let x = f32((index << 1u) & 2u);
    let y = f32(index & 2u);

    var out: VertexOutput;
    out.clip_position = vec4<f32>(x * 2.0 - 1.0, 1.0 - y * 2.0, 0.0, 1.0);
    out.uv = vec2<f32>(x, y);
    return out;
}

@fragment
fn fs_blit(in: VertexOutput) -> @location(0) vec4<f32> {
    let c = textureSample(frame_tex, frame_sampler, in.uv);
    // The fourth texel byte is padding, not alpha.
    return vec4<f32>(c.rgb, 1.0);
}
"#;
