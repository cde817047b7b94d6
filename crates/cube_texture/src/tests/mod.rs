//! Cross-module tests of textures sharing one scene
